use chrono::{DateTime, Duration, Utc};

use lesson_core::{Clock, HelpIndex, HintIndex, LessonState, PendingState};

use crate::error::HintError;
use crate::hints::handler::HintHandler;

/// Wrong answers on a fresh state before the first hint is offered with no
/// delay at all.
const WRONG_ANSWERS_FOR_IMMEDIATE_HINT: u32 = 2;

//
// ─── DELAY POLICY ──────────────────────────────────────────────────────────────
//

/// Delays between a trigger and the corresponding hint (or solution)
/// becoming available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintDelays {
    /// Wait before the first hint on a state where nothing is revealed yet.
    pub initial: Duration,
    /// Wait before each subsequent hint, and before the solution once every
    /// hint has been viewed.
    pub subsequent: Duration,
    /// Accelerated wait applied when a new wrong answer arrives.
    pub wrong_answer: Duration,
}

impl Default for HintDelays {
    fn default() -> Self {
        Self {
            initial: Duration::seconds(60),
            subsequent: Duration::seconds(30),
            wrong_answer: Duration::seconds(10),
        }
    }
}

/// A reveal armed to become available at `due_at`.
///
/// The sequence number ties the schedule to the scheduler generation that
/// armed it; cancellation bumps the generation so a stale schedule can
/// never be promoted, even if its due time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledReveal {
    due_at: DateTime<Utc>,
    sequence: u64,
}

//
// ─── PRODUCTION SCHEDULER ──────────────────────────────────────────────────────
//

/// Production hint policy: delay-gated, wrong-answer accelerated.
///
/// After each submission the player calls
/// [`maybe_schedule_show_hint`](HintHandler::maybe_schedule_show_hint),
/// which arms a delayed reveal; a periodic
/// [`check_for_hints_to_be_revealed`](Self::check_for_hints_to_be_revealed)
/// promotes a due schedule to an outstanding offer in
/// [`help_index`](Self::help_index). Hints stay offered until the learner
/// views them via [`view_hint`](Self::view_hint); only then does the clock
/// start for the next piece of help.
///
/// The scheduler never touches lesson content. It keeps its own
/// last-revealed pointer, which
/// [`show_hint_immediately`](Self::show_hint_immediately) advances by
/// exactly one step per call; the debug override leans on that single-step
/// advancement.
#[derive(Debug)]
pub struct HintScheduler {
    clock: Clock,
    delays: HintDelays,
    tracked_wrong_answer_count: u32,
    sequence: u64,
    pending: Option<ScheduledReveal>,
    help_index: HelpIndex,
    last_revealed_hint_index: Option<HintIndex>,
    solution_revealed: bool,
    hint_visible: bool,
}

impl HintScheduler {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::with_delays(clock, HintDelays::default())
    }

    #[must_use]
    pub fn with_delays(clock: Clock, delays: HintDelays) -> Self {
        Self {
            clock,
            delays,
            tracked_wrong_answer_count: 0,
            sequence: 0,
            pending: None,
            help_index: HelpIndex::Nothing,
            last_revealed_hint_index: None,
            solution_revealed: false,
            hint_visible: false,
        }
    }

    /// Replaces the clock. Tests pin a fixed clock and advance it.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Help currently offered or shown for the active state.
    #[must_use]
    pub fn help_index(&self) -> HelpIndex {
        self.help_index
    }

    /// True while a hint bubble is on screen.
    #[must_use]
    pub fn is_hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// True while a delayed reveal is armed.
    #[must_use]
    pub fn has_pending_schedule(&self) -> bool {
        self.pending.is_some()
    }

    /// Promotes a due schedule into an outstanding offer.
    ///
    /// Recomputes availability bookkeeping; the player calls this on a UI
    /// tick, and the debug override calls it once before issuing direct
    /// reveals so both variants stay consistent if the flag flips off.
    pub fn check_for_hints_to_be_revealed(&mut self, state: &LessonState) {
        let Some(scheduled) = self.pending else {
            return;
        };
        if scheduled.sequence != self.sequence || self.clock.now() < scheduled.due_at {
            return;
        }
        self.pending = None;
        self.offer_next_help(state);
    }

    /// First hint not yet revealed, merging the content snapshot with the
    /// scheduler's own pointer.
    ///
    /// # Errors
    ///
    /// Returns `HintError::NoUnrevealedHint` when every hint is revealed.
    pub fn next_hint_index_to_reveal(&self, state: &LessonState) -> Result<HintIndex, HintError> {
        let hint_count = u32::try_from(state.hint_count()).unwrap_or(u32::MAX);
        let mut index = self
            .last_revealed_hint_index
            .map_or(0, |i| i.value().saturating_add(1));
        while index < hint_count {
            match state.hint(HintIndex::new(index)) {
                Some(hint) if hint.is_revealed() => index += 1,
                _ => break,
            }
        }
        if index >= hint_count {
            Err(HintError::NoUnrevealedHint)
        } else {
            Ok(HintIndex::new(index))
        }
    }

    /// Marks the given hint as shown right now, bypassing any delay.
    ///
    /// Cancels the pending schedule and advances the last-revealed pointer
    /// to `index`, which is exactly one step when `index` came from
    /// [`next_hint_index_to_reveal`](Self::next_hint_index_to_reveal).
    ///
    /// # Errors
    ///
    /// Returns `HintError::HintOutOfRange` if `index` points past the hint
    /// list.
    pub fn show_hint_immediately(
        &mut self,
        state: &LessonState,
        index: HintIndex,
    ) -> Result<(), HintError> {
        if index.value() as usize >= state.hint_count() {
            return Err(HintError::HintOutOfRange {
                index: index.value(),
                hint_count: state.hint_count(),
            });
        }
        self.cancel_schedule();
        self.last_revealed_hint_index = Some(index);
        self.help_index = HelpIndex::LatestRevealedHint(index);
        Ok(())
    }

    /// Marks the solution as shown right now, bypassing any delay.
    pub fn show_solution_immediately(&mut self) {
        self.cancel_schedule();
        self.solution_revealed = true;
        self.help_index = HelpIndex::EverythingRevealed;
    }

    /// Learner views the offered hint. Returns its index so the player can
    /// report the reveal to the progress tracker with `is_automatic =
    /// false`, then arms the delay for the next piece of help.
    ///
    /// # Errors
    ///
    /// Returns `HintError::HelpNotAvailable` if no hint is offered.
    pub fn view_hint(&mut self, state: &LessonState) -> Result<HintIndex, HintError> {
        let HelpIndex::AvailableNextHint(index) = self.help_index else {
            return Err(HintError::HelpNotAvailable);
        };
        self.show_hint_immediately(state, index)?;
        self.hint_visible = true;
        if self.more_help_remains(state) {
            self.arm_schedule(self.delays.subsequent);
        }
        Ok(index)
    }

    /// Learner views the offered solution.
    ///
    /// # Errors
    ///
    /// Returns `HintError::HelpNotAvailable` if the solution is not
    /// currently offered.
    pub fn view_solution(&mut self) -> Result<(), HintError> {
        if self.help_index != HelpIndex::ShowSolution {
            return Err(HintError::HelpNotAvailable);
        }
        self.show_solution_immediately();
        self.hint_visible = true;
        Ok(())
    }

    /// True while any hint or the solution has not yet been shown, merging
    /// content flags with internal bookkeeping.
    #[must_use]
    pub fn more_help_remains(&self, state: &LessonState) -> bool {
        if self.next_hint_index_to_reveal(state).is_ok() {
            return true;
        }
        state.has_solution() && !self.solution_revealed && !state.is_solution_revealed()
    }

    /// True once every hint in the state has been shown.
    #[must_use]
    pub fn all_hints_revealed(&self, state: &LessonState) -> bool {
        matches!(
            self.next_hint_index_to_reveal(state),
            Err(HintError::NoUnrevealedHint)
        )
    }

    fn nothing_revealed_yet(&self, state: &LessonState) -> bool {
        self.last_revealed_hint_index.is_none()
            && !self.solution_revealed
            && state.first_unrevealed_hint_index() == Some(HintIndex::new(0))
    }

    fn offer_next_help(&mut self, state: &LessonState) {
        self.cancel_schedule();
        match self.next_hint_index_to_reveal(state) {
            Ok(index) => self.help_index = HelpIndex::AvailableNextHint(index),
            Err(_) => {
                if state.has_solution() && !self.solution_revealed {
                    self.help_index = HelpIndex::ShowSolution;
                } else {
                    self.help_index = HelpIndex::EverythingRevealed;
                }
            }
        }
    }

    fn arm_schedule(&mut self, delay: Duration) {
        self.sequence += 1;
        self.pending = Some(ScheduledReveal {
            due_at: self.clock.now() + delay,
            sequence: self.sequence,
        });
    }

    fn cancel_schedule(&mut self) {
        self.sequence += 1;
        self.pending = None;
    }
}

impl HintHandler for HintScheduler {
    fn reset(&mut self) {
        self.cancel_schedule();
        self.tracked_wrong_answer_count = 0;
        self.help_index = HelpIndex::Nothing;
        self.last_revealed_hint_index = None;
        self.solution_revealed = false;
        self.hint_visible = false;
    }

    fn hide_hint(&mut self) {
        self.hint_visible = false;
    }

    fn maybe_schedule_show_hint(
        &mut self,
        state: &LessonState,
        pending: &PendingState,
    ) -> Result<(), HintError> {
        if state.hint_count() == 0 {
            return Ok(());
        }
        self.check_for_hints_to_be_revealed(state);

        let wrong_answers = pending.wrong_answer_count();
        let is_new_wrong_answer = wrong_answers > self.tracked_wrong_answer_count;
        if is_new_wrong_answer {
            self.tracked_wrong_answer_count = wrong_answers;
        }

        if self.help_index.is_offer_outstanding() || !self.more_help_remains(state) {
            return Ok(());
        }

        if is_new_wrong_answer {
            if wrong_answers >= WRONG_ANSWERS_FOR_IMMEDIATE_HINT
                && self.nothing_revealed_yet(state)
            {
                self.offer_next_help(state);
            } else {
                self.arm_schedule(self.delays.wrong_answer);
            }
        } else if self.pending.is_none() {
            let delay = if self.nothing_revealed_yet(state) {
                self.delays.initial
            } else {
                self.delays.subsequent
            };
            self.arm_schedule(delay);
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::{Hint, Solution, fixed_clock, fixed_now};

    fn state(hints: usize, with_solution: bool) -> LessonState {
        let hints = (0..hints).map(|i| Hint::new(format!("hint {i}"))).collect();
        let solution = with_solution.then(|| Solution::new("x = 2", "solve for x"));
        LessonState::new("Equations", hints, solution)
    }

    fn scheduler_at(now: chrono::DateTime<Utc>) -> HintScheduler {
        HintScheduler::new(Clock::fixed(now))
    }

    #[test]
    fn no_hints_means_no_schedule() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        let state = state(0, false);
        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        assert!(!scheduler.has_pending_schedule());
        assert_eq!(scheduler.help_index(), HelpIndex::Nothing);
    }

    #[test]
    fn first_hint_waits_for_initial_delay() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        assert!(scheduler.has_pending_schedule());

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(59)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(scheduler.help_index(), HelpIndex::Nothing);

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(60)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::AvailableNextHint(HintIndex::new(0))
        );
    }

    #[test]
    fn wrong_answer_accelerates_the_wait() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::from_wrong_answers(1))
            .unwrap();

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(10)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::AvailableNextHint(HintIndex::new(0))
        );
    }

    #[test]
    fn second_wrong_answer_offers_first_hint_immediately() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        let state = state(3, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::from_wrong_answers(1))
            .unwrap();
        assert!(scheduler.has_pending_schedule());

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::from_wrong_answers(2))
            .unwrap();
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::AvailableNextHint(HintIndex::new(0))
        );
        assert!(!scheduler.has_pending_schedule());
    }

    #[test]
    fn repeating_the_same_wrong_count_does_not_rearm() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        let pending = PendingState::from_wrong_answers(1);
        scheduler.maybe_schedule_show_hint(&state, &pending).unwrap();
        // Same count again: the armed accelerated schedule stays.
        scheduler.maybe_schedule_show_hint(&state, &pending).unwrap();

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(10)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::AvailableNextHint(HintIndex::new(0))
        );
    }

    #[test]
    fn reset_cancels_a_pending_reveal_forever() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        scheduler.reset();
        assert!(!scheduler.has_pending_schedule());

        // Even far past the old due time nothing from the stale schedule
        // is promoted.
        scheduler.set_clock(Clock::fixed(now + Duration::seconds(600)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(scheduler.help_index(), HelpIndex::Nothing);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        scheduler.reset();
        scheduler.reset();
        assert_eq!(scheduler.help_index(), HelpIndex::Nothing);
    }

    #[test]
    fn viewing_a_hint_arms_the_next_one() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        scheduler.set_clock(Clock::fixed(now + Duration::seconds(60)));
        scheduler.check_for_hints_to_be_revealed(&state);

        let viewed = scheduler.view_hint(&state).unwrap();
        assert_eq!(viewed, HintIndex::new(0));
        assert!(scheduler.is_hint_visible());
        assert!(scheduler.has_pending_schedule());

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(90)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::AvailableNextHint(HintIndex::new(1))
        );
    }

    #[test]
    fn solution_offered_after_last_hint() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(1, true);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        scheduler.set_clock(Clock::fixed(now + Duration::seconds(60)));
        scheduler.check_for_hints_to_be_revealed(&state);
        scheduler.view_hint(&state).unwrap();

        scheduler.set_clock(Clock::fixed(now + Duration::seconds(90)));
        scheduler.check_for_hints_to_be_revealed(&state);
        assert_eq!(scheduler.help_index(), HelpIndex::ShowSolution);

        scheduler.view_solution().unwrap();
        assert_eq!(scheduler.help_index(), HelpIndex::EverythingRevealed);
        assert!(!scheduler.more_help_remains(&state));
    }

    #[test]
    fn view_hint_without_an_offer_fails() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        let state = state(1, false);
        assert_eq!(
            scheduler.view_hint(&state).unwrap_err(),
            HintError::HelpNotAvailable
        );
    }

    #[test]
    fn next_hint_index_advances_one_step_per_immediate_show() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        let state = state(3, false);

        for expected in 0..3 {
            let index = scheduler.next_hint_index_to_reveal(&state).unwrap();
            assert_eq!(index, HintIndex::new(expected));
            scheduler.show_hint_immediately(&state, index).unwrap();
        }
        assert_eq!(
            scheduler.next_hint_index_to_reveal(&state).unwrap_err(),
            HintError::NoUnrevealedHint
        );
    }

    #[test]
    fn next_hint_index_skips_content_revealed_prefix() {
        let scheduler = HintScheduler::new(fixed_clock());
        let state = state(3, false)
            .with_hint_revealed(HintIndex::new(0))
            .unwrap();
        assert_eq!(
            scheduler.next_hint_index_to_reveal(&state).unwrap(),
            HintIndex::new(1)
        );
    }

    #[test]
    fn show_hint_immediately_rejects_out_of_range() {
        let mut scheduler = HintScheduler::new(fixed_clock());
        let state = state(1, false);
        let err = scheduler
            .show_hint_immediately(&state, HintIndex::new(4))
            .unwrap_err();
        assert!(matches!(err, HintError::HintOutOfRange { index: 4, .. }));
    }

    #[test]
    fn hide_hint_only_touches_presentation() {
        let now = fixed_now();
        let mut scheduler = scheduler_at(now);
        let state = state(2, false);

        scheduler
            .maybe_schedule_show_hint(&state, &PendingState::new())
            .unwrap();
        scheduler.set_clock(Clock::fixed(now + Duration::seconds(60)));
        scheduler.check_for_hints_to_be_revealed(&state);
        scheduler.view_hint(&state).unwrap();

        scheduler.hide_hint();
        assert!(!scheduler.is_hint_visible());
        assert_eq!(
            scheduler.help_index(),
            HelpIndex::LatestRevealedHint(HintIndex::new(0))
        );
        assert!(scheduler.has_pending_schedule());
    }
}
