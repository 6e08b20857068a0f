//! Time management for the monitor
//!
//! Provides the timestamp type and two clock implementations:
//! - [`FixedTime`] for tests and replay
//! - [`MonotonicTime`] backed by `std::time::Instant` (requires `std`)

use core::cell::Cell;

use crate::traits::TimeSource;

/// Timestamp in milliseconds since monitor start
pub type Timestamp = u64;

/// Manually driven time source
///
/// Interior mutability lets tests advance the clock while a monitor holds a
/// shared reference to it.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Cell<Timestamp>,
}

impl FixedTime {
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: Cell::new(timestamp) }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}

/// Milliseconds elapsed since construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}
