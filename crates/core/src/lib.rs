#![forbid(unsafe_code)]

pub mod model;
pub mod time;

pub use model::{
    HelpIndex, HelpProgress, Hint, HintIndex, LessonState, LessonStateError, PendingState,
    Solution,
};
pub use time::{Clock, fixed_clock, fixed_now};
