//! Configuration constants for the arithmetic game
//!
//! This module contains the fixed timings, ranges and limits used
//! throughout the game, as well as the bounds that loaded options are
//! validated against.

/// Session constants
pub mod session {
    /// Number of questions in one session
    pub const TOTAL_QUESTIONS: usize = 20;
    /// Smallest number of questions a session can be configured with
    pub const MIN_TOTAL_QUESTIONS: usize = 1;
    /// Largest number of questions a session can be configured with
    pub const MAX_TOTAL_QUESTIONS: usize = 100;
}

/// Question timing constants
pub mod timing {
    /// Seconds allowed to answer a single question
    pub const QUESTION_TIME_LIMIT: u64 = 30;
    /// Minimum configurable time limit in seconds
    pub const MIN_QUESTION_TIME_LIMIT: u64 = 5;
    /// Maximum configurable time limit in seconds
    pub const MAX_QUESTION_TIME_LIMIT: u64 = 240;
    /// Interval between two countdown ticks in milliseconds
    pub const TICK_INTERVAL: u64 = 1000;
    /// Length of the feedback window in milliseconds
    pub const FEEDBACK_DURATION: u64 = 2000;
    /// Maximum configurable feedback window in milliseconds
    pub const MAX_FEEDBACK_DURATION: u64 = 10_000;
}

/// Question generation constants
pub mod question {
    /// Smallest result a generated question can have
    pub const MIN_ANSWER: u32 = 10;
    /// Largest result a generated question can have
    pub const MAX_ANSWER: u32 = 90;
    /// Largest distance between a wrong candidate and the result
    pub const WRONG_SPREAD: i32 = 10;
    /// Number of wrong candidates offered next to the result
    pub const WRONG_COUNT: usize = 3;
}

/// Display constants
pub mod display {
    /// Width of the target screen in pixels
    pub const SCREEN_WIDTH: i32 = 800;
    /// Height of the target screen in pixels
    pub const SCREEN_HEIGHT: i32 = 512;
    /// Frames presented per second by the host loop
    pub const FRAME_RATE: u64 = 60;
}

/// External selection reader constants
pub mod reader {
    /// Pause after a failed tag read before trying again, in milliseconds
    pub const RETRY_DELAY: u64 = 500;
    /// Name given to the background reader thread
    pub const THREAD_NAME: &str = "tag-reader";
}
