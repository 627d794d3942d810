//! Core game logic and state management
//!
//! This module contains the session state machine: the menu where an
//! operation is picked, the timed question cycle with its feedback window
//! and exit confirmation, and the end screen. The machine is driven once
//! per frame with the controls activated in that frame and the current
//! time; it never reads the clock or blocks on its own.

use enum_map::EnumMap;
use garde::Validate;
use serde::Serialize;
use tracing::{debug, info};
use web_time::{Duration, Instant};

use crate::{
    config::{self, Options},
    constants::timing::TICK_INTERVAL,
    question::{AnswerSlot, Operation, Question, RandomSource},
};

/// A logical on-screen control the player can activate
///
/// Hit-testing happens outside the state machine; only the resulting
/// control reaches [`Game::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Control {
    /// Menu button choosing an operation
    Operation(Operation),
    /// Menu button starting a session
    Start,
    /// One of the four answer cards
    Answer(AnswerSlot),
    /// In-game button asking to return to the menu
    MainMenu,
    /// Confirm dialog button agreeing to leave
    ConfirmYes,
    /// Confirm dialog button staying in the game
    ConfirmNo,
    /// End screen button returning to the menu
    PlayAgain,
}

/// Everything the host observed during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    /// Control hit by a click this frame
    pub activated: Option<Control>,
    /// Answer picked through the external selection reader this frame
    pub external: Option<AnswerSlot>,
}

impl Input {
    /// An input with a single activated control
    pub fn click(control: Control) -> Self {
        Self {
            activated: Some(control),
            external: None,
        }
    }

    /// An input with only an external selection
    pub fn external(slot: AnswerSlot) -> Self {
        Self {
            activated: None,
            external: Some(slot),
        }
    }
}

/// What a running question is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for an answer while the countdown runs
    Answering,
    /// Showing whether the chosen answer was right
    ShowingFeedback {
        /// The slot that was chosen
        selected: AnswerSlot,
        /// When the answer was recorded
        started: Instant,
    },
    /// Asking whether to abandon the session; the countdown is paused
    ConfirmingExit {
        /// Time elapsed since the last tick when the dialog opened
        tick_progress: Duration,
    },
}

/// An in-progress session
#[derive(Debug, Clone)]
pub struct Round {
    operation: Operation,
    question: Question,
    score: usize,
    index: usize,
    time_remaining: u32,
    last_tick: Instant,
    phase: Phase,
}

/// Result of feeding one frame to a round
enum RoundOutcome {
    Continue,
    Advance,
    Exit,
}

impl Round {
    fn select(&mut self, slot: AnswerSlot, now: Instant) {
        let correct = self.question.is_correct(slot);
        if correct {
            self.score += 1;
        }
        debug!(%slot, correct, index = self.index, "answer selected");
        self.phase = Phase::ShowingFeedback {
            selected: slot,
            started: now,
        };
    }

    fn update(&mut self, input: Input, now: Instant, options: &Options) -> RoundOutcome {
        match self.phase {
            Phase::Answering => {
                if now.saturating_duration_since(self.last_tick)
                    >= Duration::from_millis(TICK_INTERVAL)
                {
                    self.time_remaining = self.time_remaining.saturating_sub(1);
                    self.last_tick = now;
                    if self.time_remaining == 0 {
                        debug!(index = self.index, "question timed out");
                        return RoundOutcome::Advance;
                    }
                }

                let clicked_answer = match input.activated {
                    Some(Control::Answer(slot)) => Some(slot),
                    _ => None,
                };

                if let Some(slot) = input.external.or(clicked_answer) {
                    self.select(slot, now);
                } else if input.activated == Some(Control::MainMenu) {
                    debug!("exit confirmation opened");
                    self.phase = Phase::ConfirmingExit {
                        tick_progress: now.saturating_duration_since(self.last_tick),
                    };
                }

                RoundOutcome::Continue
            }
            Phase::ShowingFeedback { started, .. } => {
                if now.saturating_duration_since(started) >= options.feedback_duration {
                    RoundOutcome::Advance
                } else {
                    RoundOutcome::Continue
                }
            }
            Phase::ConfirmingExit { tick_progress } => match input.activated {
                Some(Control::ConfirmYes) => RoundOutcome::Exit,
                Some(Control::ConfirmNo) => {
                    debug!("exit confirmation dismissed");
                    self.phase = Phase::Answering;
                    self.last_tick = now.checked_sub(tick_progress).unwrap_or(now);
                    RoundOutcome::Continue
                }
                _ => RoundOutcome::Continue,
            },
        }
    }

    /// The operation being practiced
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The question on screen
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Correct answers so far
    pub fn score(&self) -> usize {
        self.score
    }

    /// Number of questions already finished
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whole seconds left on the countdown
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// The current sub-state
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// The screen the game is showing
#[derive(Debug, Clone)]
pub enum Screen {
    /// Operation picker
    Menu {
        /// The operation chosen so far, if any
        selected: Option<Operation>,
    },
    /// A session in progress
    Game(Box<Round>),
    /// Final score of the finished session
    End {
        /// Correct answers
        score: usize,
        /// Questions asked
        total: usize,
    },
}

/// The session state machine
///
/// Generic over its source of randomness so that tests can pin down the
/// generated questions.
#[derive(Debug)]
pub struct Game<R: RandomSource = fastrand::Rng> {
    options: Options,
    rng: R,
    screen: Screen,
}

impl Game {
    /// Creates a game on the menu screen with a fresh random source
    ///
    /// # Errors
    ///
    /// Returns [`config::Error::Invalid`] if `options` fail validation.
    pub fn new(options: Options) -> Result<Self, config::Error> {
        Self::with_rng(options, fastrand::Rng::new())
    }
}

impl<R: RandomSource> Game<R> {
    /// Creates a game on the menu screen with the given random source
    ///
    /// # Errors
    ///
    /// Returns [`config::Error::Invalid`] if `options` fail validation,
    /// e.g. a session without questions or a zero time limit.
    pub fn with_rng(options: Options, rng: R) -> Result<Self, config::Error> {
        options.validate().map_err(config::Error::Invalid)?;
        Ok(Self {
            options,
            rng,
            screen: Screen::Menu { selected: None },
        })
    }

    /// Feeds one frame of input to the state machine
    ///
    /// # Arguments
    ///
    /// * `input` - Controls and external selections observed this frame
    /// * `now` - The time of the frame; timers compare against it
    pub fn receive(&mut self, input: Input, now: Instant) {
        match &mut self.screen {
            Screen::Menu { selected } => match input.activated {
                Some(Control::Operation(operation)) => *selected = Some(operation),
                Some(Control::Start) => {
                    if let Some(operation) = *selected {
                        self.start(operation, now);
                    }
                }
                _ => {}
            },
            Screen::Game(round) => match round.update(input, now, &self.options) {
                RoundOutcome::Continue => {}
                RoundOutcome::Advance => self.advance(now),
                RoundOutcome::Exit => {
                    info!(
                        score = round.score,
                        index = round.index,
                        "session abandoned"
                    );
                    self.screen = Screen::Menu { selected: None };
                }
            },
            Screen::End { .. } => {
                if input.activated == Some(Control::PlayAgain) {
                    self.screen = Screen::Menu { selected: None };
                }
            }
        }
    }

    /// Starts a fresh session for `operation`
    fn start(&mut self, operation: Operation, now: Instant) {
        info!(%operation, total = self.options.total_questions, "session started");
        self.screen = Screen::Game(Box::new(Round {
            operation,
            question: Question::generate(operation, &mut self.rng),
            score: 0,
            index: 0,
            time_remaining: self.options.question_seconds(),
            last_tick: now,
            phase: Phase::Answering,
        }));
    }

    /// Moves past the current question, ending the session after the last
    fn advance(&mut self, now: Instant) {
        let Screen::Game(round) = &mut self.screen else {
            return;
        };

        round.index += 1;
        if round.index >= self.options.total_questions {
            let (score, total) = (round.score, self.options.total_questions);
            info!(score, total, "session finished");
            self.screen = Screen::End { score, total };
        } else {
            round.question = Question::generate(round.operation, &mut self.rng);
            round.time_remaining = self.options.question_seconds();
            round.last_tick = now;
            round.phase = Phase::Answering;
        }
    }

    /// The options the game runs with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The current screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The running session, if any
    pub fn round(&self) -> Option<&Round> {
        match &self.screen {
            Screen::Game(round) => Some(&**round),
            _ => None,
        }
    }

    /// The operation picked on the menu or being practiced
    pub fn operation(&self) -> Option<Operation> {
        match &self.screen {
            Screen::Menu { selected } => *selected,
            Screen::Game(round) => Some(round.operation),
            Screen::End { .. } => None,
        }
    }

    /// Correct answers in the running or finished session
    pub fn score(&self) -> usize {
        match &self.screen {
            Screen::Menu { .. } => 0,
            Screen::Game(round) => round.score,
            Screen::End { score, .. } => *score,
        }
    }

    /// Questions finished in the running or finished session
    pub fn question_index(&self) -> usize {
        match &self.screen {
            Screen::Menu { .. } => 0,
            Screen::Game(round) => round.index,
            Screen::End { total, .. } => *total,
        }
    }

    /// Questions already decided, counting one whose feedback is showing
    ///
    /// The score is bumped as soon as an answer is picked while the index
    /// only moves once the feedback window closes, so this is the count the
    /// score is bounded by.
    pub fn resolved_questions(&self) -> usize {
        self.question_index() + usize::from(self.is_feedback_active())
    }

    /// Whether the correctness highlight is showing
    pub fn is_feedback_active(&self) -> bool {
        self.round()
            .is_some_and(|round| matches!(round.phase, Phase::ShowingFeedback { .. }))
    }

    /// Whether the exit confirmation dialog is open
    pub fn is_confirm_open(&self) -> bool {
        self.round()
            .is_some_and(|round| matches!(round.phase, Phase::ConfirmingExit { .. }))
    }

    /// Describes what should be on screen right now
    pub fn view(&self) -> View {
        match &self.screen {
            Screen::Menu { selected } => View::Menu {
                selected: *selected,
                can_start: selected.is_some(),
            },
            Screen::Game(round) => View::Game(GameView::new(round, self.options.total_questions)),
            Screen::End { score, total } => View::End {
                score: *score,
                total: *total,
            },
        }
    }
}

/// Correctness highlight of an answer card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Highlight {
    /// No feedback
    #[default]
    Neutral,
    /// The true result
    Correct,
    /// A wrong pick
    Incorrect,
}

/// An answer card as it should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// The number on the card
    pub value: u32,
    /// Feedback colouring
    pub highlight: Highlight,
}

/// Render description of the in-game screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Operation being practiced
    pub operation: Operation,
    /// Question card text
    pub prompt: String,
    /// The four answer cards
    pub candidates: EnumMap<AnswerSlot, Candidate>,
    /// Slot holding the true result
    pub correct: AnswerSlot,
    /// Correct answers so far
    pub score: usize,
    /// Zero-based position of the question on screen
    pub index: usize,
    /// Questions decided so far, including one under feedback
    pub answered: usize,
    /// Questions in the session
    pub total: usize,
    /// Whole seconds left on the countdown
    pub time_remaining: u32,
    /// Whether the correctness highlight is showing
    pub feedback: bool,
    /// Whether the exit confirmation dialog is open
    pub confirm_open: bool,
}

impl GameView {
    fn new(round: &Round, total: usize) -> Self {
        let correct = round.question.correct();
        let highlights: EnumMap<AnswerSlot, Highlight> = match round.phase {
            Phase::ShowingFeedback { selected, .. } => EnumMap::from_fn(|slot| {
                if slot == correct {
                    Highlight::Correct
                } else if slot == selected {
                    Highlight::Incorrect
                } else {
                    Highlight::Neutral
                }
            }),
            _ => EnumMap::default(),
        };

        let feedback = matches!(round.phase, Phase::ShowingFeedback { .. });

        Self {
            operation: round.operation,
            prompt: round.question.prompt().to_owned(),
            candidates: EnumMap::from_fn(|slot| Candidate {
                value: round.question.candidates()[slot],
                highlight: highlights[slot],
            }),
            correct,
            score: round.score,
            index: round.index,
            answered: round.index + usize::from(feedback),
            total,
            time_remaining: round.time_remaining,
            feedback,
            confirm_open: matches!(round.phase, Phase::ConfirmingExit { .. }),
        }
    }

    /// Header line with the running score, e.g. `"Score: 3/4"`
    pub fn score_text(&self) -> String {
        format!("Score: {}/{}", self.score, self.answered)
    }

    /// Header line with the question number, e.g. `"Question 5/20"`
    pub fn progress_text(&self) -> String {
        format!("Question {}/{}", self.index + 1, self.total)
    }

    /// Header line with the countdown, e.g. `"Time: 17"`
    pub fn timer_text(&self) -> String {
        format!("Time: {}", self.time_remaining)
    }
}

/// Render description produced once per frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum View {
    /// Operation picker
    Menu {
        /// Highlighted operation
        selected: Option<Operation>,
        /// Whether the start button is enabled
        can_start: bool,
    },
    /// A running session
    Game(GameView),
    /// Final results
    End {
        /// Correct answers
        score: usize,
        /// Questions asked
        total: usize,
    },
}

impl View {
    /// Converts the view to a JSON string for out-of-process renderers
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::question::tests::ScriptedSource;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn started_game(operation: Operation, t0: Instant) -> Game {
        let mut game = Game::with_rng(Options::default(), fastrand::Rng::with_seed(7)).unwrap();
        game.receive(Input::click(Control::Operation(operation)), t0);
        game.receive(Input::click(Control::Start), t0);
        game
    }

    fn correct_slot<R: RandomSource>(game: &Game<R>) -> AnswerSlot {
        game.round().unwrap().question().correct()
    }

    fn wrong_slot<R: RandomSource>(game: &Game<R>) -> AnswerSlot {
        let correct = correct_slot(game);
        AnswerSlot::ALL
            .into_iter()
            .find(|slot| *slot != correct)
            .unwrap()
    }

    fn assert_invariants<R: RandomSource>(game: &Game<R>) {
        assert!(game.score() <= game.resolved_questions());
        assert!(game.resolved_questions() <= game.options().total_questions);
        if !game.is_feedback_active() {
            assert!(game.score() <= game.question_index());
        }
        assert!(!(game.is_feedback_active() && game.is_confirm_open()));
        assert_eq!(
            game.round().is_some(),
            matches!(game.screen(), Screen::Game(_))
        );
    }

    #[test]
    fn test_new_game_starts_on_menu() {
        let game = Game::new(Options::default()).unwrap();
        assert!(matches!(game.screen(), Screen::Menu { selected: None }));
        assert_eq!(
            game.view(),
            View::Menu {
                selected: None,
                can_start: false
            }
        );
    }

    #[test]
    fn test_start_requires_operation() {
        let t0 = Instant::now();
        let mut game = Game::new(Options::default()).unwrap();
        game.receive(Input::click(Control::Start), t0);
        assert!(matches!(game.screen(), Screen::Menu { selected: None }));
    }

    #[test]
    fn test_operation_choice_replaces_previous() {
        let t0 = Instant::now();
        let mut game = Game::new(Options::default()).unwrap();
        game.receive(Input::click(Control::Operation(Operation::Addition)), t0);
        game.receive(Input::click(Control::Operation(Operation::Division)), t0);
        game.receive(Input::click(Control::Operation(Operation::Division)), t0);

        assert_eq!(game.operation(), Some(Operation::Division));
        assert_eq!(
            game.view(),
            View::Menu {
                selected: Some(Operation::Division),
                can_start: true
            }
        );
    }

    #[test]
    fn test_start_resets_session() {
        let t0 = Instant::now();
        let game = started_game(Operation::Multiplication, t0);
        let round = game.round().unwrap();

        assert_eq!(round.score(), 0);
        assert_eq!(round.index(), 0);
        assert_eq!(round.time_remaining(), 30);
        assert_eq!(round.phase(), Phase::Answering);
        assert_eq!(round.operation(), Operation::Multiplication);
        assert_eq!(round.question().operation(), Operation::Multiplication);
    }

    #[test]
    fn test_scripted_first_question() {
        let t0 = Instant::now();
        let mut game =
            Game::with_rng(Options::default(), ScriptedSource::new([42, 17, 1, 2, 3])).unwrap();
        game.receive(Input::click(Control::Operation(Operation::Addition)), t0);
        game.receive(Input::click(Control::Start), t0);

        let View::Game(view) = game.view() else {
            panic!("expected the game screen");
        };
        assert_eq!(view.prompt, "25 + 17 = ?");
        assert!(view.candidates.values().any(|c| c.value == 42));
        assert_eq!(view.candidates[view.correct].value, 42);
    }

    #[test]
    fn test_timer_ticks_once_per_call() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);

        game.receive(Input::default(), t0 + ms(999));
        assert_eq!(game.round().unwrap().time_remaining(), 30);

        // five seconds late still counts as a single tick
        game.receive(Input::default(), t0 + ms(5000));
        assert_eq!(game.round().unwrap().time_remaining(), 29);

        game.receive(Input::default(), t0 + ms(5500));
        assert_eq!(game.round().unwrap().time_remaining(), 29);
        game.receive(Input::default(), t0 + ms(6000));
        assert_eq!(game.round().unwrap().time_remaining(), 28);
    }

    #[test]
    fn test_timeout_advances_without_scoring() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Subtraction, t0);

        for second in 1..=29 {
            game.receive(Input::default(), t0 + Duration::from_secs(second));
            assert!(!game.is_feedback_active());
            assert_eq!(game.question_index(), 0);
        }
        assert_eq!(game.round().unwrap().time_remaining(), 1);

        game.receive(Input::default(), t0 + Duration::from_secs(30));
        let round = game.round().unwrap();
        assert_eq!(round.index(), 1);
        assert_eq!(round.score(), 0);
        assert_eq!(round.time_remaining(), 30);
        assert_eq!(round.phase(), Phase::Answering);
        assert!(!game.is_feedback_active());

        // the timer restarts from the moment of the timeout
        game.receive(Input::default(), t0 + Duration::from_secs(30) + ms(999));
        assert_eq!(game.round().unwrap().time_remaining(), 30);
    }

    #[test]
    fn test_timeout_on_last_question_ends_game() {
        let t0 = Instant::now();
        let options = Options {
            total_questions: 1,
            question_time_limit: Duration::from_secs(5),
            ..Options::default()
        };
        let mut game = Game::with_rng(options, fastrand::Rng::with_seed(3)).unwrap();
        game.receive(Input::click(Control::Operation(Operation::Addition)), t0);
        game.receive(Input::click(Control::Start), t0);

        for second in 1..=5 {
            game.receive(Input::default(), t0 + Duration::from_secs(second));
        }

        assert!(matches!(game.screen(), Screen::End { score: 0, total: 1 }));
    }

    #[test]
    fn test_answer_in_expiring_frame_is_dropped() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        for second in 1..=29 {
            game.receive(Input::default(), t0 + Duration::from_secs(second));
        }

        let expiring = correct_slot(&game);
        game.receive(
            Input {
                activated: Some(Control::Answer(expiring)),
                external: Some(expiring),
            },
            t0 + Duration::from_secs(30),
        );

        let round = game.round().unwrap();
        assert_eq!(round.index(), 1);
        assert_eq!(round.score(), 0);
        assert_eq!(round.phase(), Phase::Answering);
        assert_eq!(round.time_remaining(), 30);
        assert!(!game.is_feedback_active());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let no_questions = Options {
            total_questions: 0,
            ..Options::default()
        };
        assert!(matches!(
            Game::with_rng(no_questions, fastrand::Rng::with_seed(1)),
            Err(config::Error::Invalid(_))
        ));

        let no_time = Options {
            question_time_limit: Duration::ZERO,
            ..Options::default()
        };
        assert!(matches!(
            Game::new(no_time),
            Err(config::Error::Invalid(_))
        ));
    }

    #[test]
    fn test_correct_answer_scores_and_advances() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);

        game.receive(Input::click(Control::Answer(correct_slot(&game))), t0 + ms(300));
        assert_eq!(game.score(), 1);
        assert!(game.is_feedback_active());
        assert_eq!(game.resolved_questions(), 1);
        let View::Game(view) = game.view() else {
            panic!("expected the game screen");
        };
        assert_eq!(view.score_text(), "Score: 1/1");
        assert_eq!(view.progress_text(), "Question 1/20");

        game.receive(Input::default(), t0 + ms(2299));
        assert!(game.is_feedback_active());
        assert_eq!(game.question_index(), 0);

        game.receive(Input::default(), t0 + ms(2300));
        assert!(!game.is_feedback_active());
        assert_eq!(game.question_index(), 1);
        assert_eq!(game.score(), 1);
        assert_eq!(game.round().unwrap().time_remaining(), 30);
    }

    #[test]
    fn test_wrong_answer_highlights() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Division, t0);
        let correct = correct_slot(&game);
        let wrong = wrong_slot(&game);

        game.receive(Input::click(Control::Answer(wrong)), t0);
        assert_eq!(game.score(), 0);

        let View::Game(view) = game.view() else {
            panic!("expected the game screen");
        };
        assert!(view.feedback);
        for slot in AnswerSlot::ALL {
            let expected = if slot == correct {
                Highlight::Correct
            } else if slot == wrong {
                Highlight::Incorrect
            } else {
                Highlight::Neutral
            };
            assert_eq!(view.candidates[slot].highlight, expected);
        }
    }

    #[test]
    fn test_correct_pick_highlights_only_that_card() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        let correct = correct_slot(&game);

        game.receive(Input::click(Control::Answer(correct)), t0);
        let View::Game(view) = game.view() else {
            panic!("expected the game screen");
        };
        assert_eq!(
            view.candidates
                .values()
                .filter(|c| c.highlight != Highlight::Neutral)
                .count(),
            1
        );
        assert_eq!(view.candidates[correct].highlight, Highlight::Correct);
    }

    #[test]
    fn test_answers_ignored_during_feedback() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        let correct = correct_slot(&game);

        game.receive(Input::click(Control::Answer(correct)), t0);
        game.receive(Input::click(Control::Answer(correct)), t0 + ms(100));
        game.receive(Input::external(correct), t0 + ms(200));
        game.receive(Input::click(Control::MainMenu), t0 + ms(300));

        assert_eq!(game.score(), 1);
        assert!(!game.is_confirm_open());
    }

    #[test]
    fn test_timer_frozen_during_feedback() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);

        game.receive(Input::click(Control::Answer(wrong_slot(&game))), t0 + ms(900));
        game.receive(Input::default(), t0 + ms(1500));
        assert_eq!(game.round().unwrap().time_remaining(), 30);
    }

    #[test]
    fn test_external_selection_answers() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Multiplication, t0);

        game.receive(Input::external(correct_slot(&game)), t0);
        assert_eq!(game.score(), 1);
        assert!(game.is_feedback_active());
    }

    #[test]
    fn test_external_selection_wins_over_click() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        let correct = correct_slot(&game);
        let wrong = wrong_slot(&game);

        game.receive(
            Input {
                activated: Some(Control::Answer(wrong)),
                external: Some(correct),
            },
            t0,
        );

        assert_eq!(game.score(), 1);
        let Phase::ShowingFeedback { selected, .. } = game.round().unwrap().phase() else {
            panic!("expected feedback");
        };
        assert_eq!(selected, correct);
    }

    #[test]
    fn test_confirm_no_restores_state() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);

        game.receive(Input::default(), t0 + ms(1000));
        game.receive(Input::default(), t0 + ms(2000));
        let before = game.round().unwrap().clone();

        game.receive(Input::click(Control::MainMenu), t0 + ms(2400));
        assert!(game.is_confirm_open());
        assert!(!game.is_feedback_active());

        // answers and the countdown are frozen behind the dialog
        game.receive(Input::click(Control::Answer(correct_slot(&game))), t0 + ms(5000));
        game.receive(Input::external(correct_slot(&game)), t0 + ms(9000));
        assert_eq!(game.score(), 0);
        assert_eq!(game.round().unwrap().time_remaining(), 28);

        game.receive(Input::click(Control::ConfirmNo), t0 + ms(10_000));
        let after = game.round().unwrap();
        assert_eq!(after.phase(), Phase::Answering);
        assert_eq!(after.question(), before.question());
        assert_eq!(after.score(), before.score());
        assert_eq!(after.index(), before.index());
        assert_eq!(after.time_remaining(), before.time_remaining());

        // 400ms had elapsed toward the next tick when the dialog opened
        game.receive(Input::default(), t0 + ms(10_599));
        assert_eq!(game.round().unwrap().time_remaining(), 28);
        game.receive(Input::default(), t0 + ms(10_600));
        assert_eq!(game.round().unwrap().time_remaining(), 27);
    }

    #[test]
    fn test_confirm_yes_returns_to_menu() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Subtraction, t0);
        game.receive(Input::click(Control::Answer(correct_slot(&game))), t0);
        game.receive(Input::default(), t0 + ms(2000));

        game.receive(Input::click(Control::MainMenu), t0 + ms(2100));
        game.receive(Input::click(Control::ConfirmYes), t0 + ms(2200));

        assert!(matches!(game.screen(), Screen::Menu { selected: None }));
        assert_eq!(game.score(), 0);
        assert_eq!(game.question_index(), 0);
        assert!(game.round().is_none());
    }

    #[test]
    fn test_dialog_buttons_ignored_while_answering() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        game.receive(Input::click(Control::ConfirmYes), t0);
        game.receive(Input::click(Control::PlayAgain), t0);

        assert!(matches!(game.screen(), Screen::Game(_)));
        assert_eq!(game.round().unwrap().phase(), Phase::Answering);
    }

    #[test]
    fn test_full_session_reaches_end() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Division, t0);
        let mut now = t0;
        let mut expected_score = 0;

        for question in 0..20 {
            assert_eq!(game.question_index(), question);
            let slot = if question % 3 == 0 {
                wrong_slot(&game)
            } else {
                expected_score += 1;
                correct_slot(&game)
            };
            now += ms(400);
            game.receive(Input::click(Control::Answer(slot)), now);
            assert_invariants(&game);
            now += ms(2000);
            game.receive(Input::default(), now);
            assert_invariants(&game);
        }

        assert!(matches!(
            game.screen(),
            Screen::End { score, total: 20 } if *score == expected_score
        ));
        assert_eq!(game.view(), View::End {
            score: expected_score,
            total: 20
        });
        assert!(game.score() <= 20);
    }

    #[test]
    fn test_play_again_clears_operation() {
        let t0 = Instant::now();
        let options = Options {
            total_questions: 1,
            ..Options::default()
        };
        let mut game = Game::with_rng(options, fastrand::Rng::with_seed(11)).unwrap();
        game.receive(Input::click(Control::Operation(Operation::Addition)), t0);
        game.receive(Input::click(Control::Start), t0);
        game.receive(Input::click(Control::Answer(correct_slot(&game))), t0);
        game.receive(Input::default(), t0 + ms(2000));
        assert!(matches!(game.screen(), Screen::End { score: 1, total: 1 }));

        game.receive(Input::click(Control::Start), t0 + ms(2100));
        assert!(matches!(game.screen(), Screen::End { .. }));

        game.receive(Input::click(Control::PlayAgain), t0 + ms(2200));
        assert!(matches!(game.screen(), Screen::Menu { selected: None }));

        game.receive(Input::click(Control::Operation(Operation::Division)), t0 + ms(2300));
        game.receive(Input::click(Control::Start), t0 + ms(2300));
        assert_eq!(game.score(), 0);
        assert_eq!(game.question_index(), 0);
    }

    #[test]
    fn test_external_selection_ignored_outside_game() {
        let t0 = Instant::now();
        let mut game = Game::new(Options::default()).unwrap();
        game.receive(Input::external(AnswerSlot::B), t0);
        assert!(matches!(game.screen(), Screen::Menu { selected: None }));
    }

    #[test]
    fn test_header_texts() {
        let t0 = Instant::now();
        let mut game = started_game(Operation::Addition, t0);
        game.receive(Input::click(Control::Answer(correct_slot(&game))), t0);
        game.receive(Input::default(), t0 + ms(2000));
        game.receive(Input::default(), t0 + ms(3000));

        let View::Game(view) = game.view() else {
            panic!("expected the game screen");
        };
        assert_eq!(view.score_text(), "Score: 1/1");
        assert_eq!(view.progress_text(), "Question 2/20");
        assert_eq!(view.timer_text(), "Time: 29");
    }

    #[test]
    fn test_view_to_message() {
        let t0 = Instant::now();
        let game = started_game(Operation::Addition, t0);
        let json = game.view().to_message();

        assert!(json.contains("Game"));
        assert!(json.contains("Addition"));
        assert!(json.contains("\"time_remaining\":30"));
    }
}
