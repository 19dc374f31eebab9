use std::sync::Arc;

use lesson_core::{LessonState, PendingState};

use crate::error::HintError;
use crate::flags::RevealAllFlag;
use crate::hints::handler::HintHandler;
use crate::hints::scheduler::HintScheduler;
use crate::progress::ProgressTracker;

/// Hint handler for showing every hint and the solution as soon as they
/// exist, bypassing wrong-answer gating and delays, while the reveal-all
/// developer option is enabled. With the option off it behaves exactly
/// like the wrapped production scheduler.
///
/// Wraps the scheduler by composition; `reset` and `hide_hint` always
/// delegate regardless of the flag, and the flag is read once per
/// submission so a flip mid-sequence never retracts reveals already
/// reported.
pub struct DebugHintHandler {
    inner: HintScheduler,
    progress: Arc<dyn ProgressTracker>,
    reveal_all: RevealAllFlag,
}

impl DebugHintHandler {
    #[must_use]
    pub fn new(
        inner: HintScheduler,
        progress: Arc<dyn ProgressTracker>,
        reveal_all: RevealAllFlag,
    ) -> Self {
        Self {
            inner,
            progress,
            reveal_all,
        }
    }

    /// The wrapped production scheduler, for the player UI to read
    /// availability from.
    #[must_use]
    pub fn scheduler(&self) -> &HintScheduler {
        &self.inner
    }

    #[must_use]
    pub fn scheduler_mut(&mut self) -> &mut HintScheduler {
        &mut self.inner
    }

    /// Reveals every hint and, when present, the solution for `state`,
    /// reporting each reveal as automatic.
    ///
    /// Runs the wrapped scheduler's availability recomputation once first,
    /// then loops exactly once per hint in the list. Each iteration asks the
    /// scheduler for the next unrevealed index and shows it immediately,
    /// relying on the scheduler advancing its pointer by exactly one step
    /// per show. If a hint was already revealed before this path ran, the
    /// loop bound overshoots the remaining count; the scheduler then
    /// answers `NoUnrevealedHint`, which ends the loop instead of
    /// re-reporting anything.
    ///
    /// # Errors
    ///
    /// Propagates progress-tracker failures; an empty hint list is a
    /// guarded no-op, not an error.
    pub fn show_all_hints_and_solution(&mut self, state: &LessonState) -> Result<(), HintError> {
        if state.hint_count() == 0 {
            // Nothing to reveal on this state.
            return Ok(());
        }

        self.inner.check_for_hints_to_be_revealed(state);

        for _ in 0..state.hint_count() {
            let index = match self.inner.next_hint_index_to_reveal(state) {
                Ok(index) => index,
                Err(HintError::NoUnrevealedHint) => break,
                Err(e) => return Err(e),
            };
            self.inner.show_hint_immediately(state, index)?;
            self.progress.submit_hint_is_revealed(state, true, index)?;
        }

        if self.inner.all_hints_revealed(state) && state.has_solution() {
            self.inner.show_solution_immediately();
            self.progress.submit_solution_is_revealed(state)?;
        }
        Ok(())
    }
}

impl HintHandler for DebugHintHandler {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn hide_hint(&mut self) {
        self.inner.hide_hint();
    }

    fn maybe_schedule_show_hint(
        &mut self,
        state: &LessonState,
        pending: &PendingState,
    ) -> Result<(), HintError> {
        if self.reveal_all.is_enabled() {
            self.show_all_hints_and_solution(state)
        } else {
            self.inner.maybe_schedule_show_hint(state, pending)
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
