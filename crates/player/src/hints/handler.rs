use lesson_core::{LessonState, PendingState};

use crate::error::HintError;

/// Capability contract the lesson player drives on every submission and
/// state transition.
///
/// Two concrete variants exist: [`HintScheduler`](crate::hints::HintScheduler)
/// applies the production delay policy, and
/// [`DebugHintHandler`](crate::hints::DebugHintHandler) wraps it to bypass
/// all gating while the reveal-all developer option is on. The variant is
/// picked at construction time; callers hold a `dyn HintHandler`.
pub trait HintHandler {
    /// Clears counters and cancels any pending delayed reveal. Called when
    /// the learner navigates to a new lesson state; idempotent and safe
    /// with no schedule outstanding. A reveal armed before `reset` can
    /// never take effect after it returns.
    fn reset(&mut self);

    /// Dismisses the currently displayed hint bubble without marking
    /// anything revealed. Presentation-only.
    fn hide_hint(&mut self);

    /// Invoked after each learner submission, right or wrong. Decides
    /// whether to start or advance a reveal schedule for `state`.
    ///
    /// Never schedules for a state without hints and never offers a hint
    /// out of ascending order.
    ///
    /// # Errors
    ///
    /// The production policy is infallible here; the debug variant
    /// propagates reporting failures from the progress tracker.
    fn maybe_schedule_show_hint(
        &mut self,
        state: &LessonState,
        pending: &PendingState,
    ) -> Result<(), HintError>;
}
