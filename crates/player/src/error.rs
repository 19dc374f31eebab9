//! Shared error types for the player crate.

use thiserror::Error;

use lesson_core::LessonStateError;

/// Errors emitted by the hint handler family and the progress tracker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HintError {
    /// The next-unrevealed-hint primitive was asked for a hint when none
    /// remains. The original treated this as undefined behavior; here it is
    /// an explicit error the caller can observe.
    #[error("no unrevealed hint remains")]
    NoUnrevealedHint,

    #[error("hint index {index} out of range for state with {hint_count} hints")]
    HintOutOfRange { index: u32, hint_count: usize },

    #[error("no help is currently offered to view")]
    HelpNotAvailable,

    #[error("progress tracker unavailable: {0}")]
    TrackerUnavailable(String),

    #[error(transparent)]
    State(#[from] LessonStateError),
}
