//! Time source abstraction
//!
//! The engine and the cache read time through [`Clock`] so decision
//! logic can be driven deterministically in tests and simulations.

use std::sync::atomic::{AtomicI64, Ordering};

/// Provider of the current time as epoch seconds.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now_ts(&self) -> i64;
}

/// Wall-clock time via [`chrono::Utc`]. The default in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ts(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start` epoch seconds.
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, ts: i64) {
        self.now.store(ts, Ordering::SeqCst);
    }

    /// Move forward (or backward, with a negative argument) by `secs`.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Move forward by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(minutes * 60);
    }
}

impl Clock for ManualClock {
    fn now_ts(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
