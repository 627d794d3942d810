//! Fixed-rate host loop
//!
//! Each frame samples the pointer, hit-tests the click against the buttons
//! currently on screen, polls the external selection reader, feeds all of
//! it to the [`Game`] and presents the resulting view.

use std::thread;

use tracing::info;
use web_time::{Duration, Instant};

use crate::{
    constants::display::FRAME_RATE,
    frontend::{PointerSource, Surface},
    game::{Game, Input},
    layout,
    question::RandomSource,
    selection::SelectionResolver,
};

/// Time budget of a single frame
pub const FRAME_INTERVAL: Duration = Duration::from_micros(1_000_000 / FRAME_RATE);

/// Drives a game against a surface and a pointer
pub struct Runner<S, P, R: RandomSource = fastrand::Rng> {
    game: Game<R>,
    surface: S,
    pointer: P,
    resolver: SelectionResolver,
}

impl<S: Surface, P: PointerSource, R: RandomSource> Runner<S, P, R> {
    /// Creates a runner
    ///
    /// # Arguments
    ///
    /// * `game` - The state machine to drive
    /// * `surface` - Where frames are presented
    /// * `pointer` - Where clicks come from
    /// * `resolver` - External selection source; pass
    ///   [`SelectionResolver::disabled`] when there is no reader
    pub fn new(game: Game<R>, surface: S, pointer: P, resolver: SelectionResolver) -> Self {
        Self {
            game,
            surface,
            pointer,
            resolver,
        }
    }

    /// Runs a single frame
    ///
    /// # Returns
    ///
    /// `false` once the pointer source asks to quit
    pub fn frame(&mut self, now: Instant) -> bool {
        let pointer = self.pointer.poll();
        if pointer.quit {
            return false;
        }

        let activated = match pointer.position {
            Some(position) if pointer.clicked => {
                let on_screen = layout::buttons(&self.game.view(), None);
                layout::hit_test(&on_screen, position)
            }
            _ => None,
        };

        // polled every frame so that tags read outside a session are dropped
        let external = self.resolver.poll_selection();

        self.game.receive(Input { activated, external }, now);

        let view = self.game.view();
        let buttons = layout::buttons(&view, pointer.position);
        self.surface.present(&view, &buttons);

        true
    }

    /// Runs frames at the fixed frame rate until asked to quit
    pub fn run(&mut self) {
        info!(frame_rate = FRAME_RATE, "game loop started");
        loop {
            let started = Instant::now();
            if !self.frame(started) {
                break;
            }
            let spent = started.elapsed();
            if spent < FRAME_INTERVAL {
                thread::sleep(FRAME_INTERVAL - spent);
            }
        }
        info!("game loop stopped");
    }

    /// The game being driven
    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    /// The surface frames are presented on
    pub fn surface(&self) -> &S {
        &self.surface
    }
}
