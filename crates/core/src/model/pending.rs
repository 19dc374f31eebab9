use serde::{Deserialize, Serialize};

/// Transient summary of the learner's recent answer history for the current
/// state.
///
/// Rebuilt by the lesson player on every submission and handed to the hint
/// handler; it never outlives the state it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingState {
    wrong_answer_count: u32,
}

impl PendingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_wrong_answers(wrong_answer_count: u32) -> Self {
        Self { wrong_answer_count }
    }

    #[must_use]
    pub fn wrong_answer_count(&self) -> u32 {
        self.wrong_answer_count
    }

    /// Returns the pending state after one more wrong answer.
    #[must_use]
    pub fn record_wrong_answer(self) -> Self {
        Self {
            wrong_answer_count: self.wrong_answer_count.saturating_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_pending_state_has_no_wrong_answers() {
        assert_eq!(PendingState::new().wrong_answer_count(), 0);
    }

    #[test]
    fn record_wrong_answer_increments() {
        let pending = PendingState::new()
            .record_wrong_answer()
            .record_wrong_answer();
        assert_eq!(pending.wrong_answer_count(), 2);
        assert_eq!(pending, PendingState::from_wrong_answers(2));
    }
}
