//! Time management for the controller
//!
//! Provides clock abstraction to handle different time sources:
//! - System clock (when available)
//! - Monotonic uptime counter (for run-time accounting)
//! - Fixed clock (for tests)
//!
//! All depletion accounting is delta-based, so a monotonic source is
//! sufficient; wall-clock time is only nicer for log output.

/// Timestamp in milliseconds since epoch (or device boot for monotonic)
pub type Timestamp = u64;

/// Milliseconds in one second, for readability at call sites
pub const MILLIS_PER_SEC: u64 = 1000;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;
}

/// Collaborator that can block the control loop for a bounded interval
///
/// The sensor sampling routine legitimately blocks while waiting for
/// sensor warm-up and between averaged samples; everything else in the
/// core is non-blocking. Implementations sleep (std), spin a hardware
/// timer (embedded), or record the request (tests).
pub trait Pause {
    /// Block for `ms` milliseconds
    fn pause_ms(&mut self, ms: u32);
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Monotonic uptime source (requires std)
///
/// Starts at 0 on construction, immune to wall-clock adjustments.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct UptimeClock {
    started: std::time::Instant,
}

#[cfg(feature = "std")]
impl UptimeClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for UptimeClock {
    fn now(&self) -> Timestamp {
        self.started.elapsed().as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Thread-sleeping pause (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ThreadPause;

#[cfg(feature = "std")]
impl Pause for ThreadPause {
    fn pause_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }

    /// Move forward by whole seconds
    pub fn advance_secs(&mut self, secs: u64) {
        self.timestamp += secs * MILLIS_PER_SEC;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Pause that does nothing
///
/// For synthetic sensors with no warm-up time, and for tests.
#[derive(Debug, Clone, Default)]
pub struct NoPause;

impl Pause for NoPause {
    fn pause_ms(&mut self, _ms: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.advance_secs(2);
        assert_eq!(clock.now(), 3500);
    }

    #[cfg(feature = "std")]
    #[test]
    fn uptime_clock_is_monotonic() {
        let clock = UptimeClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(!clock.is_wall_clock());
    }
}
