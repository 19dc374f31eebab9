use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to the "show all hints and solution" developer option.
///
/// Cheap to clone; the flag is shared between the developer-options surface
/// and any number of hint handlers. Handlers read it once per call, so a
/// flip between calls takes effect on the next submission and a flip
/// mid-sequence never rolls back reveals already reported.
#[derive(Debug, Clone, Default)]
pub struct RevealAllFlag {
    enabled: Arc<AtomicBool>,
}

impl RevealAllFlag {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_defaults_off() {
        assert!(!RevealAllFlag::default().is_enabled());
    }

    #[test]
    fn clones_share_the_same_flag() {
        let flag = RevealAllFlag::new(false);
        let other = flag.clone();
        flag.set_enabled(true);
        assert!(other.is_enabled());
    }
}
