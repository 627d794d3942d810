//! Presentation and input boundaries
//!
//! The game core never draws or reads devices itself. A host provides a
//! [`Surface`] that turns the per-frame render description into pixels and
//! a [`PointerSource`] that reports what the pointer did since the last
//! frame. Window setup, fonts and images live entirely behind these traits.

use crate::{game::View, layout::Button, layout::Point};

/// What the pointer did during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Current pointer position, if the pointer is over the window
    pub position: Option<Point>,
    /// Whether the primary button was pressed this frame
    pub clicked: bool,
    /// Whether the user asked to close the game
    pub quit: bool,
}

/// Trait for drawing frames
///
/// Implementations might use a framebuffer, a windowing toolkit, or
/// forward [`View::to_message`] to another process.
pub trait Surface {
    /// Draws and presents one frame
    ///
    /// # Arguments
    ///
    /// * `view` - What the game wants shown
    /// * `buttons` - The buttons on screen with their drawing states
    fn present(&mut self, view: &View, buttons: &[Button]);
}

/// Trait for sampling pointer input
pub trait PointerSource {
    /// Collects the pointer activity since the previous call
    fn poll(&mut self) -> PointerState;
}
