use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised when a revealed-state transition would break lesson invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonStateError {
    #[error("hint index {index} out of range for state with {hint_count} hints")]
    HintIndexOutOfRange { index: u32, hint_count: usize },

    #[error("hint {index} cannot be revealed before hint {expected}")]
    RevealedOutOfOrder { index: u32, expected: u32 },

    #[error("solution cannot be revealed while hints remain hidden")]
    SolutionStillLocked,

    #[error("state declares no solution")]
    NoSolution,
}

//
// ─── HINT INDEX ────────────────────────────────────────────────────────────────
//

/// State-relative index identifying a hint within its parent state.
///
/// The "next unrevealed hint" is always computed on demand from a
/// `LessonState` snapshot; a `HintIndex` is never stored in content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HintIndex(u32);

impl HintIndex {
    /// Creates a new `HintIndex`
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Index of the hint after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for HintIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HintIndex({})", self.0)
    }
}

impl fmt::Display for HintIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `HintIndex` from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHintIndexError;

impl fmt::Display for ParseHintIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse HintIndex from string")
    }
}

impl std::error::Error for ParseHintIndexError {}

impl FromStr for HintIndex {
    type Err = ParseHintIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(HintIndex::new)
            .map_err(|_| ParseHintIndexError)
    }
}

//
// ─── HINT & SOLUTION ───────────────────────────────────────────────────────────
//

/// A single hint attached to a lesson state.
///
/// Position in the parent state's hint list is the hint's stable index.
/// The revealed flag is only ever flipped through the progress tracker;
/// hints are revealed in strictly ascending index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    text: String,
    is_revealed: bool,
}

impl Hint {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_revealed: false,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }
}

/// The worked solution for a lesson state.
///
/// Optional, at most one per state; only revealable once every hint in the
/// state has been revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    correct_answer: String,
    explanation: String,
    is_revealed: bool,
}

impl Solution {
    #[must_use]
    pub fn new(correct_answer: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            correct_answer: correct_answer.into(),
            explanation: explanation.into(),
            is_revealed: false,
        }
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }
}

//
// ─── LESSON STATE ──────────────────────────────────────────────────────────────
//

/// Immutable snapshot of one interactive lesson screen.
///
/// Produced by the content pipeline and replaced wholesale on every
/// navigation. Schedulers only read it; new snapshots with updated revealed
/// flags come exclusively from the `with_*` constructors, which the progress
/// tracker owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonState {
    name: String,
    hints: Vec<Hint>,
    solution: Option<Solution>,
}

impl LessonState {
    #[must_use]
    pub fn new(name: impl Into<String>, hints: Vec<Hint>, solution: Option<Solution>) -> Self {
        Self {
            name: name.into(),
            hints,
            solution,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    #[must_use]
    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    #[must_use]
    pub fn hint(&self, index: HintIndex) -> Option<&Hint> {
        self.hints.get(index.value() as usize)
    }

    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    #[must_use]
    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    /// First hint not yet marked revealed, or `None` when all are revealed
    /// (including the no-hints case).
    #[must_use]
    pub fn first_unrevealed_hint_index(&self) -> Option<HintIndex> {
        self.hints
            .iter()
            .position(|hint| !hint.is_revealed())
            .and_then(|pos| u32::try_from(pos).ok())
            .map(HintIndex::new)
    }

    /// True when every hint is revealed. Vacuously true for a state without
    /// hints.
    #[must_use]
    pub fn all_hints_revealed(&self) -> bool {
        self.hints.iter().all(Hint::is_revealed)
    }

    #[must_use]
    pub fn is_solution_revealed(&self) -> bool {
        self.solution.as_ref().is_some_and(Solution::is_revealed)
    }

    /// Returns a new snapshot with the given hint marked revealed.
    ///
    /// # Errors
    ///
    /// Returns `HintIndexOutOfRange` if `index` points past the hint list.
    /// Returns `RevealedOutOfOrder` if an earlier hint is still hidden.
    pub fn with_hint_revealed(&self, index: HintIndex) -> Result<Self, LessonStateError> {
        let pos = index.value() as usize;
        if pos >= self.hints.len() {
            return Err(LessonStateError::HintIndexOutOfRange {
                index: index.value(),
                hint_count: self.hints.len(),
            });
        }
        if let Some(first_hidden) = self.first_unrevealed_hint_index()
            && first_hidden < index
        {
            return Err(LessonStateError::RevealedOutOfOrder {
                index: index.value(),
                expected: first_hidden.value(),
            });
        }

        let mut next = self.clone();
        next.hints[pos].is_revealed = true;
        Ok(next)
    }

    /// Returns a new snapshot with the solution marked revealed.
    ///
    /// # Errors
    ///
    /// Returns `NoSolution` if the state declares no solution.
    /// Returns `SolutionStillLocked` while any hint is still hidden.
    pub fn with_solution_revealed(&self) -> Result<Self, LessonStateError> {
        if self.solution.is_none() {
            return Err(LessonStateError::NoSolution);
        }
        if !self.all_hints_revealed() {
            return Err(LessonStateError::SolutionStillLocked);
        }

        let mut next = self.clone();
        if let Some(solution) = next.solution.as_mut() {
            solution.is_revealed = true;
        }
        Ok(next)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
