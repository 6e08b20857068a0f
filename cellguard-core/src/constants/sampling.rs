//! Sampling and Logging Sizing

/// Samples per RMS window.
///
/// 100 samples × 50 µs ≈ 5 ms per quantity.
pub const RMS_SAMPLE_COUNT: u16 = 100;

/// Spacing between RMS samples (µs).
pub const RMS_SAMPLE_SPACING_US: u32 = 50;

/// Wait after a channel switch before the instantaneous read (µs).
pub const SETTLE_DELAY_US: u32 = 10;

/// Entries kept by the circular log.
pub const LOG_CAPACITY: usize = 100;

/// Interval between measurement cycles and log entries (ms).
///
/// Energy statistics assume every entry represents exactly this much time.
pub const LOG_INTERVAL_MS: u32 = 1000;

/// Milliseconds per hour, for watt-hour integration.
pub const MS_PER_HOUR: f32 = 3_600_000.0;

/// Capacity of the command line buffer (bytes, including one reserved byte).
///
/// Lines keep at most `COMMAND_LINE_CAPACITY - 1` bytes.
pub const COMMAND_LINE_CAPACITY: usize = 64;
