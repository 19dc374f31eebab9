use serde::{Deserialize, Serialize};

use crate::model::lesson::HintIndex;

//
// ─── HELP INDEX ────────────────────────────────────────────────────────────────
//

/// What help the scheduler is currently offering for the active state.
///
/// Progresses monotonically within one state: nothing, then hints one at a
/// time, then the solution, then everything. `reset()` snaps it back to
/// `Nothing` when the learner navigates away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HelpIndex {
    /// No help is available or on screen.
    #[default]
    Nothing,
    /// The given hint may now be viewed by the learner.
    AvailableNextHint(HintIndex),
    /// The given hint is the most recent one the learner viewed.
    LatestRevealedHint(HintIndex),
    /// All hints are viewed and the solution may now be viewed.
    ShowSolution,
    /// Every hint and the solution have been revealed.
    EverythingRevealed,
}

impl HelpIndex {
    /// True while an offer is on screen waiting for the learner to act.
    #[must_use]
    pub fn is_offer_outstanding(&self) -> bool {
        matches!(self, Self::AvailableNextHint(_) | Self::ShowSolution)
    }
}

//
// ─── HELP PROGRESS ─────────────────────────────────────────────────────────────
//

/// Snapshot of revealed help for one state, broadcast by the progress
/// tracker after every accepted reveal.
///
/// `revealed_hint_indices` is always an ascending, gap-free prefix of the
/// state's hint list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HelpProgress {
    pub state_name: String,
    pub revealed_hint_indices: Vec<HintIndex>,
    pub solution_revealed: bool,
}

impl HelpProgress {
    #[must_use]
    pub fn revealed_hint_count(&self) -> usize {
        self.revealed_hint_indices.len()
    }
}
