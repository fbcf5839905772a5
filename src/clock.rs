//! Injectable time source for the scheduler
//!
//! The scheduler never reads wall-clock time directly; it is driven by a
//! [`Clock`] supplying "current time" and "block for a duration". Timestamps
//! are plain `f64` seconds, consistent only with themselves; no epoch or
//! unit is assumed beyond monotonic non-decrease.
//!
//! Two implementations are provided:
//!
//! - [`SystemClock`] - the default, anchored to a monotonic [`Instant`]
//! - [`ManualClock`] - a virtual clock for tests, advanced explicitly

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source driving the scheduler queue
pub trait Clock {
    /// Current time in seconds on this clock's timeline
    fn now(&self) -> f64;

    /// Block the calling thread for `secs` seconds
    fn sleep(&self, secs: f64);
}

// ============================================================================
// System Clock
// ============================================================================

/// Monotonic clock backed by [`Instant`]
///
/// Time starts at zero when the clock is created and only moves forward.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock anchored to the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&self, secs: f64) {
        if secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

/// Virtual clock for tests
///
/// Time stands still until advanced. Clones share the same underlying time
/// cell, so a test can hold one handle while the scheduler owns another.
/// `sleep` advances the virtual time instead of blocking, which lets the
/// blocking run mode terminate deterministically under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock starting at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `start` seconds
    pub fn starting_at(start: f64) -> Self {
        let clock = Self::new();
        clock.set(start);
        clock
    }

    /// Jump the clock to an absolute time
    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    /// Move the clock forward by `secs` seconds
    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn sleep(&self, secs: f64) {
        if secs > 0.0 {
            self.advance(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_manual_clock_stands_still() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::starting_at(10.0);
        clock.advance(5.0);
        assert_eq!(clock.now(), 15.0);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.set(42.0);
        assert_eq!(clock.now(), 42.0);
    }

    #[test]
    fn test_manual_clock_sleep_advances() {
        let clock = ManualClock::new();
        clock.sleep(3.0);
        assert_eq!(clock.now(), 3.0);
    }
}
