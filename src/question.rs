//! Arithmetic question generation
//!
//! This module produces the questions asked during a session. Every
//! question is built backwards from a two-digit result: the result is
//! drawn first, the operands are derived from it, and three nearby wrong
//! candidates are mixed in with it before shuffling.

use std::ops::{Range, RangeInclusive};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::question::{MAX_ANSWER, MIN_ANSWER, WRONG_COUNT, WRONG_SPREAD};

/// The arithmetic operation a session practices
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Enum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Operation {
    /// `a + b`
    Addition,
    /// `a - b`
    Subtraction,
    /// `a × b`
    Multiplication,
    /// `a ÷ b`
    Division,
}

impl Operation {
    /// All operations in menu order
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    /// The glyph shown between the two operands
    pub fn glyph(self) -> char {
        match self {
            Self::Addition => '+',
            Self::Subtraction => '-',
            Self::Multiplication => '×',
            Self::Division => '÷',
        }
    }

    /// Evaluates the operation on two operands
    ///
    /// # Returns
    ///
    /// The exact result, or `None` if it is negative, overflows, or the
    /// division leaves a remainder.
    pub fn evaluate(self, lhs: u32, rhs: u32) -> Option<u32> {
        match self {
            Self::Addition => lhs.checked_add(rhs),
            Self::Subtraction => lhs.checked_sub(rhs),
            Self::Multiplication => lhs.checked_mul(rhs),
            Self::Division => (rhs != 0 && lhs % rhs == 0).then(|| lhs / rhs),
        }
    }
}

/// One of the four answer positions of a question
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Enum,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum AnswerSlot {
    /// Top-left answer card
    A,
    /// Top-right answer card
    B,
    /// Bottom-left answer card
    C,
    /// Bottom-right answer card
    D,
}

impl AnswerSlot {
    /// All slots in display order
    pub const ALL: [AnswerSlot; 4] = [AnswerSlot::A, AnswerSlot::B, AnswerSlot::C, AnswerSlot::D];

    /// Position of the slot, `0` for `A` through `3` for `D`
    pub fn index(self) -> usize {
        self.into_usize()
    }

    /// Slot at the given position, if there is one
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Source of randomness for question generation
///
/// Implemented for [`fastrand::Rng`]; tests substitute scripted sources
/// to pin down exact questions.
pub trait RandomSource {
    /// Uniform value in the inclusive range
    fn u32(&mut self, range: RangeInclusive<u32>) -> u32;

    /// Uniform value in the inclusive range
    fn i32(&mut self, range: RangeInclusive<i32>) -> i32;

    /// Uniform index in the half-open range
    fn usize(&mut self, range: Range<usize>) -> usize;

    /// Shuffles the slice in place
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl RandomSource for fastrand::Rng {
    fn u32(&mut self, range: RangeInclusive<u32>) -> u32 {
        fastrand::Rng::u32(self, range)
    }

    fn i32(&mut self, range: RangeInclusive<i32>) -> i32 {
        fastrand::Rng::i32(self, range)
    }

    fn usize(&mut self, range: Range<usize>) -> usize {
        fastrand::Rng::usize(self, range)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        fastrand::Rng::shuffle(self, items);
    }
}

/// The two operands of a question together with their result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operands {
    /// Left-hand operand
    pub lhs: u32,
    /// Right-hand operand
    pub rhs: u32,
    /// Value of `lhs op rhs`
    pub answer: u32,
}

impl Operands {
    /// Derives operands for `operation` that evaluate to exactly `answer`
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation joining the operands
    /// * `answer` - The intended result, at least `1`
    /// * `rng` - Source used to pick the right-hand operand
    pub(crate) fn for_answer<R: RandomSource>(
        operation: Operation,
        answer: u32,
        rng: &mut R,
    ) -> Self {
        let (lhs, rhs) = match operation {
            Operation::Addition => {
                let rhs = rng.u32(1..=answer.saturating_sub(1).max(1));
                (answer.saturating_sub(rhs), rhs)
            }
            Operation::Subtraction => {
                let rhs = rng.u32(1..=answer.saturating_sub(1).max(1));
                (answer + rhs, rhs)
            }
            Operation::Multiplication => {
                let divisors = (1..=answer).filter(|d| answer % d == 0).collect_vec();
                let rhs = divisors[rng.usize(0..divisors.len())];
                (answer / rhs, rhs)
            }
            Operation::Division => {
                let rhs = rng.u32(1..=answer);
                (answer * rhs, rhs)
            }
        };

        Self { lhs, rhs, answer }
    }
}

/// A single question with its four shuffled candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    operation: Operation,
    operands: Operands,
    prompt: String,
    candidates: EnumMap<AnswerSlot, u32>,
    correct: AnswerSlot,
}

impl Question {
    /// Generates a fresh question for the operation
    ///
    /// The result is drawn uniformly from the two-digit range, so every
    /// question of every operation has a result in `[10, 90]`.
    pub fn generate<R: RandomSource>(operation: Operation, rng: &mut R) -> Self {
        let answer = rng.u32(MIN_ANSWER..=MAX_ANSWER);
        let operands = Operands::for_answer(operation, answer, rng);
        Self::from_operands(operation, operands, rng)
    }

    /// Builds a question around already chosen operands
    ///
    /// Wrong candidates are drawn within `WRONG_SPREAD` of the result,
    /// rejecting the result itself, negative values and repeats.
    pub fn from_operands<R: RandomSource>(
        operation: Operation,
        operands: Operands,
        rng: &mut R,
    ) -> Self {
        let answer = operands.answer;

        let mut values = Vec::with_capacity(WRONG_COUNT + 1);
        values.push(answer);
        while values.len() < WRONG_COUNT + 1 {
            let delta = rng.i32(-WRONG_SPREAD..=WRONG_SPREAD);
            if delta == 0 {
                continue;
            }
            let Some(wrong) = answer.checked_add_signed(delta) else {
                continue;
            };
            if !values.contains(&wrong) {
                values.push(wrong);
            }
        }

        rng.shuffle(&mut values);

        let correct = values
            .iter()
            .position(|v| *v == answer)
            .and_then(AnswerSlot::from_index)
            .unwrap_or(AnswerSlot::A);

        Self {
            operation,
            prompt: format!(
                "{} {} {} = ?",
                operands.lhs,
                operation.glyph(),
                operands.rhs
            ),
            operands,
            candidates: EnumMap::from_fn(|slot: AnswerSlot| values[slot.index()]),
            correct,
        }
    }

    /// The operation this question practices
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The operands and result
    pub fn operands(&self) -> Operands {
        self.operands
    }

    /// Text shown on the question card, e.g. `"25 + 17 = ?"`
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The four candidates by slot
    pub fn candidates(&self) -> &EnumMap<AnswerSlot, u32> {
        &self.candidates
    }

    /// Slot holding the true result
    pub fn correct(&self) -> AnswerSlot {
        self.correct
    }

    /// Whether choosing `slot` answers the question correctly
    pub fn is_correct(&self, slot: AnswerSlot) -> bool {
        slot == self.correct
    }
}
