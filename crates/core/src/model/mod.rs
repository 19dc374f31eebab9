mod help;
mod lesson;
mod pending;

pub use help::{HelpIndex, HelpProgress};
pub use lesson::{Hint, HintIndex, LessonState, LessonStateError, ParseHintIndexError, Solution};
pub use pending::PendingState;
