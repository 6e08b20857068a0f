//! Time Source and Delay Abstractions
//!
//! Both are injected so tests can run the RMS engine and the monitor cycle
//! deterministically, without wall-clock time.

use fugit::MicrosDurationU32;

use crate::time::Timestamp;

/// Source of monotonic time
///
/// The epoch is implementation-defined; the monitor uses "milliseconds since
/// start". Values must never decrease.
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Blocking wait used for the fixed sampling delays
///
/// On hardware this is a busy-wait; tests substitute a recorder that
/// returns immediately.
pub trait Delay {
    /// Block for `duration`
    fn delay(&mut self, duration: MicrosDurationU32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self, duration: MicrosDurationU32) {
        (**self).delay(duration)
    }
}
