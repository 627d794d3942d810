//! # Arithmetic Game Library
//!
//! This library provides the core logic of a single-screen arithmetic quiz
//! for small touchscreen devices. It covers question generation, the
//! session state machine (menu, timed questions with feedback and an exit
//! confirmation, end screen), optional answer input through a tag reader,
//! and a declarative button layout. Drawing and device access are left to
//! the host through the traits in [`frontend`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod constants;
pub mod frontend;
pub mod game;
pub mod layout;
pub mod question;
pub mod runner;
pub mod selection;

pub use config::Options;
pub use game::{Control, Game, Input, Screen, View};
pub use question::{AnswerSlot, Operation, Question};
pub use selection::SelectionResolver;
