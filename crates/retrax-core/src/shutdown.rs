//! Cooperative shutdown flag.
//!
//! The harvest loop polls a `ShutdownFlag` between requests and during
//! rate-limit waits; the CLI's signal handlers set the process-global
//! instance. Tests hand the loop a private flag instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Returns whether it was already requested.
    pub fn request(&self) -> bool {
        self.0.swap(true, Ordering::Relaxed)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Process-global flag, set by the SIGINT/SIGTERM handlers.
pub fn global() -> &'static ShutdownFlag {
    static FLAG: std::sync::LazyLock<ShutdownFlag> = std::sync::LazyLock::new(ShutdownFlag::new);
    &FLAG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_sticky() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_requested());
        assert!(!flag.request());
        assert!(flag.is_requested());
        // second request reports the flag was already set
        assert!(flag.request());
    }

    #[test]
    fn clones_share_state() {
        let flag = ShutdownFlag::new();
        let other = flag.clone();
        flag.request();
        assert!(other.is_requested());
    }
}
