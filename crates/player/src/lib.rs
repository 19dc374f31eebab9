#![forbid(unsafe_code)]

pub mod error;
pub mod flags;
pub mod hints;
pub mod progress;

pub use lesson_core::Clock;

pub use error::HintError;
pub use flags::RevealAllFlag;
pub use hints::{DebugHintHandler, HintDelays, HintHandler, HintScheduler};
pub use progress::{LessonProgressTracker, ProgressTracker, RevealEvent};
