mod debug;
mod handler;
mod scheduler;

// Public API of the hint subsystem.
pub use debug::DebugHintHandler;
pub use handler::HintHandler;
pub use scheduler::{HintDelays, HintScheduler};
