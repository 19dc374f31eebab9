use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::watch;

use lesson_core::{HelpProgress, HintIndex, LessonState, LessonStateError, Solution};

use crate::error::HintError;

//
// ─── PROGRESS TRACKER CONTRACT ─────────────────────────────────────────────────
//

/// Records hint and solution revelation for the active lesson.
///
/// The tracker is the single writer of revealed state: schedulers only
/// compute decisions and delegate the write here.
pub trait ProgressTracker: Send + Sync {
    /// Records that a specific hint transitioned to revealed.
    ///
    /// `is_automatic` distinguishes reveals issued by the reveal-all debug
    /// path from learner-initiated ones.
    ///
    /// # Errors
    ///
    /// Returns `HintError::HintOutOfRange` for an index past the hint list
    /// and `HintError::State` when the reveal would break ascending order.
    fn submit_hint_is_revealed(
        &self,
        state: &LessonState,
        is_automatic: bool,
        hint_index: HintIndex,
    ) -> Result<(), HintError>;

    /// Records that the solution transitioned to revealed.
    ///
    /// # Errors
    ///
    /// Returns `HintError::State` if the state declares no solution or any
    /// hint is still hidden.
    fn submit_solution_is_revealed(&self, state: &LessonState) -> Result<(), HintError>;
}

/// One accepted reveal, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    Hint {
        state_name: String,
        hint_index: HintIndex,
        is_automatic: bool,
    },
    Solution {
        state_name: String,
    },
}

//
// ─── IN-MEMORY TRACKER ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StateRecord {
    revealed: Vec<HintIndex>,
    solution_revealed: bool,
}

impl StateRecord {
    /// Seed a record from the content snapshot, so a state restored with a
    /// partially revealed prefix is not re-reported from index zero.
    fn seed_from(state: &LessonState) -> Self {
        let revealed = state
            .hints()
            .iter()
            .take_while(|hint| hint.is_revealed())
            .enumerate()
            .filter_map(|(pos, _)| u32::try_from(pos).ok())
            .map(HintIndex::new)
            .collect();
        Self {
            revealed,
            solution_revealed: state.solution().is_some_and(Solution::is_revealed),
        }
    }
}

#[derive(Debug, Default)]
struct TrackerInner {
    records: HashMap<String, StateRecord>,
    events: Vec<RevealEvent>,
}

/// In-memory progress tracker with a latest-value broadcast.
///
/// Progress is keyed by state name, so navigating between states keeps each
/// state's record. Every accepted reveal publishes a fresh [`HelpProgress`]
/// snapshot through a `watch` channel: late subscribers see the current
/// value and all subsequent changes, not every intermediate one.
///
/// Re-reporting an already revealed hint or solution is accepted without a
/// second event or broadcast, so a reveal-all pass issued after partial
/// manual reveals never produces duplicates.
#[derive(Debug)]
pub struct LessonProgressTracker {
    inner: Mutex<TrackerInner>,
    tx: watch::Sender<HelpProgress>,
}

impl LessonProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HelpProgress::default());
        Self {
            inner: Mutex::new(TrackerInner::default()),
            tx,
        }
    }

    /// Subscribes to progress snapshots. The receiver immediately holds the
    /// latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HelpProgress> {
        self.tx.subscribe()
    }

    /// Latest broadcast snapshot.
    #[must_use]
    pub fn latest(&self) -> HelpProgress {
        self.tx.borrow().clone()
    }

    /// All accepted reveals, in submission order.
    ///
    /// # Errors
    ///
    /// Returns `HintError::TrackerUnavailable` if the tracker lock is
    /// poisoned.
    pub fn events(&self) -> Result<Vec<RevealEvent>, HintError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| HintError::TrackerUnavailable(e.to_string()))?;
        Ok(guard.events.clone())
    }

    /// Revealed hint indices recorded for the given state.
    ///
    /// # Errors
    ///
    /// Returns `HintError::TrackerUnavailable` if the tracker lock is
    /// poisoned.
    pub fn revealed_hints(&self, state_name: &str) -> Result<Vec<HintIndex>, HintError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| HintError::TrackerUnavailable(e.to_string()))?;
        Ok(guard
            .records
            .get(state_name)
            .map(|record| record.revealed.clone())
            .unwrap_or_default())
    }

    fn snapshot(state_name: &str, record: &StateRecord) -> HelpProgress {
        HelpProgress {
            state_name: state_name.to_owned(),
            revealed_hint_indices: record.revealed.clone(),
            solution_revealed: record.solution_revealed,
        }
    }
}

impl Default for LessonProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker for LessonProgressTracker {
    fn submit_hint_is_revealed(
        &self,
        state: &LessonState,
        is_automatic: bool,
        hint_index: HintIndex,
    ) -> Result<(), HintError> {
        if hint_index.value() as usize >= state.hint_count() {
            return Err(HintError::HintOutOfRange {
                index: hint_index.value(),
                hint_count: state.hint_count(),
            });
        }

        let mut guard = self
            .inner
            .lock()
            .map_err(|e| HintError::TrackerUnavailable(e.to_string()))?;
        let record = guard
            .records
            .entry(state.name().to_owned())
            .or_insert_with(|| StateRecord::seed_from(state));

        if record.revealed.contains(&hint_index) {
            // Idempotent: already recorded, nothing to re-broadcast.
            return Ok(());
        }

        let expected = u32::try_from(record.revealed.len()).unwrap_or(u32::MAX);
        if hint_index.value() != expected {
            return Err(LessonStateError::RevealedOutOfOrder {
                index: hint_index.value(),
                expected,
            }
            .into());
        }

        record.revealed.push(hint_index);
        let snapshot = Self::snapshot(state.name(), record);
        guard.events.push(RevealEvent::Hint {
            state_name: state.name().to_owned(),
            hint_index,
            is_automatic,
        });
        drop(guard);

        self.tx.send_replace(snapshot);
        Ok(())
    }

    fn submit_solution_is_revealed(&self, state: &LessonState) -> Result<(), HintError> {
        if !state.has_solution() {
            return Err(LessonStateError::NoSolution.into());
        }

        let mut guard = self
            .inner
            .lock()
            .map_err(|e| HintError::TrackerUnavailable(e.to_string()))?;
        let record = guard
            .records
            .entry(state.name().to_owned())
            .or_insert_with(|| StateRecord::seed_from(state));

        if record.solution_revealed {
            return Ok(());
        }
        if record.revealed.len() != state.hint_count() {
            return Err(LessonStateError::SolutionStillLocked.into());
        }

        record.solution_revealed = true;
        let snapshot = Self::snapshot(state.name(), record);
        guard.events.push(RevealEvent::Solution {
            state_name: state.name().to_owned(),
        });
        drop(guard);

        self.tx.send_replace(snapshot);
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::{Hint, LessonState, Solution};

    fn state_with_hints(n: usize, with_solution: bool) -> LessonState {
        let hints = (0..n).map(|i| Hint::new(format!("hint {i}"))).collect();
        let solution = with_solution.then(|| Solution::new("42", "because"));
        LessonState::new("Algebra", hints, solution)
    }

    #[test]
    fn hints_recorded_in_ascending_order() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(2, false);

        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(0))
            .unwrap();
        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(1))
            .unwrap();

        assert_eq!(
            tracker.revealed_hints("Algebra").unwrap(),
            vec![HintIndex::new(0), HintIndex::new(1)]
        );
    }

    #[test]
    fn out_of_order_reveal_is_rejected() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(3, false);

        let err = tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(1))
            .unwrap_err();
        assert_eq!(
            err,
            HintError::State(LessonStateError::RevealedOutOfOrder {
                index: 1,
                expected: 0
            })
        );
    }

    #[test]
    fn out_of_range_reveal_is_rejected() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(1, false);

        let err = tracker
            .submit_hint_is_revealed(&state, true, HintIndex::new(5))
            .unwrap_err();
        assert!(matches!(err, HintError::HintOutOfRange { index: 5, .. }));
    }

    #[test]
    fn duplicate_reveal_is_idempotent() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(1, false);

        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(0))
            .unwrap();
        tracker
            .submit_hint_is_revealed(&state, true, HintIndex::new(0))
            .unwrap();

        assert_eq!(tracker.events().unwrap().len(), 1);
    }

    #[test]
    fn solution_requires_all_hints_revealed() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(1, true);

        let err = tracker.submit_solution_is_revealed(&state).unwrap_err();
        assert_eq!(err, HintError::State(LessonStateError::SolutionStillLocked));

        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(0))
            .unwrap();
        tracker.submit_solution_is_revealed(&state).unwrap();
        assert!(tracker.latest().solution_revealed);
    }

    #[test]
    fn solution_without_declaration_is_rejected() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(0, false);

        let err = tracker.submit_solution_is_revealed(&state).unwrap_err();
        assert_eq!(err, HintError::State(LessonStateError::NoSolution));
    }

    #[test]
    fn late_subscriber_sees_latest_snapshot() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(2, false);

        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(0))
            .unwrap();
        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(1))
            .unwrap();

        let rx = tracker.subscribe();
        let progress = rx.borrow().clone();
        assert_eq!(progress.state_name, "Algebra");
        assert_eq!(progress.revealed_hint_count(), 2);
    }

    #[test]
    fn restored_state_is_not_re_reported_from_zero() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(3, false)
            .with_hint_revealed(HintIndex::new(0))
            .unwrap();

        // Index 0 arrived already revealed in content, so index 1 is next.
        tracker
            .submit_hint_is_revealed(&state, false, HintIndex::new(1))
            .unwrap();
        assert_eq!(
            tracker.revealed_hints("Algebra").unwrap(),
            vec![HintIndex::new(0), HintIndex::new(1)]
        );
        assert_eq!(tracker.events().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscriber_observes_changes() {
        let tracker = LessonProgressTracker::new();
        let state = state_with_hints(1, false);
        let mut rx = tracker.subscribe();

        tracker
            .submit_hint_is_revealed(&state, true, HintIndex::new(0))
            .unwrap();

        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().revealed_hint_indices,
            vec![HintIndex::new(0)]
        );
    }
}
