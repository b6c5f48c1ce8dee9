//! Host time adapter.
//!
//! Provides the monotonic millisecond clock that drives the flight loop
//! (frame deadlines, beacon interval, ground-contact window).  Uses
//! `std::time::Instant`, so it never jumps when the wall clock is set.

use std::time::Instant;

/// Monotonic uptime source for the host simulator.
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since start (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds since start (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
