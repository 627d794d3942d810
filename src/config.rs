//! Session options
//!
//! Options are static for the lifetime of the program. They default to
//! the fixed values in [`crate::constants`] and can be overridden from a
//! JSON document, which is validated before use.

use std::collections::HashSet;

use enum_map::EnumMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::{
    constants::{session, timing},
    question::AnswerSlot,
    selection::TagTable,
};

type ValidationResult = garde::Result;

/// Validates that the question time limit lies within the configured bounds
fn validate_time_limit(val: &Duration) -> ValidationResult {
    let bounds = timing::MIN_QUESTION_TIME_LIMIT..=timing::MAX_QUESTION_TIME_LIMIT;
    if bounds.contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "question_time_limit is outside of the bounds [{},{}]",
            bounds.start(),
            bounds.end()
        )))
    }
}

fn validate_feedback_duration(val: &Duration) -> ValidationResult {
    if val.as_millis() <= u128::from(timing::MAX_FEEDBACK_DURATION) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "feedback_duration exceeds {}ms",
            timing::MAX_FEEDBACK_DURATION
        )))
    }
}

/// Tags must be non-empty and distinct so each one resolves to one slot
fn validate_tags(tags: &TagTable) -> ValidationResult {
    if tags.values().any(|tag| tag.trim().is_empty()) {
        return Err(garde::Error::new("tag identifiers cannot be empty"));
    }
    let distinct: HashSet<&str> = tags.values().map(String::as_str).collect();
    if distinct.len() == AnswerSlot::ALL.len() {
        Ok(())
    } else {
        Err(garde::Error::new("tag identifiers must be distinct"))
    }
}

/// Tag identifiers shipped with the game, one per answer slot
pub fn default_tags() -> TagTable {
    EnumMap::from_fn(|slot: AnswerSlot| format!("TAG_{slot}_ID"))
}

/// Options for a game
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Number of questions in one session
    #[garde(range(min = session::MIN_TOTAL_QUESTIONS, max = session::MAX_TOTAL_QUESTIONS))]
    pub total_questions: usize,
    /// Time allowed for each question, counted down in whole seconds
    #[garde(custom(|v, _| validate_time_limit(v)))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub question_time_limit: Duration,
    /// How long the correctness highlight stays up after an answer
    #[garde(custom(|v, _| validate_feedback_duration(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub feedback_duration: Duration,
    /// Identifier of the physical tag standing for each answer slot
    #[garde(custom(|v, _| validate_tags(v)))]
    pub tags: TagTable,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            total_questions: session::TOTAL_QUESTIONS,
            question_time_limit: Duration::from_secs(timing::QUESTION_TIME_LIMIT),
            feedback_duration: Duration::from_millis(timing::FEEDBACK_DURATION),
            tags: default_tags(),
        }
    }
}

/// Errors that can occur while loading options
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not valid JSON for [`Options`]
    #[error("malformed options: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but holds values outside the allowed bounds
    #[error("invalid options: {0}")]
    Invalid(garde::Report),
}

impl Options {
    /// Parses and validates options from JSON
    ///
    /// Fields missing from the document keep their default value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed JSON and [`Error::Invalid`]
    /// when a value is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: Self = serde_json::from_str(json)?;
        options.validate().map_err(Error::Invalid)?;
        Ok(options)
    }

    /// The time limit as a whole number of seconds
    pub fn question_seconds(&self) -> u32 {
        u32::try_from(self.question_time_limit.as_secs()).unwrap_or(u32::MAX)
    }
}
