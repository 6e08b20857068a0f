//! Constants for CellGuard Core
//!
//! Centralized numeric values used by conversion, evaluation and logging.
//! Every constant carries its unit in the name.
//!
//! ## Organization
//!
//! - **Hardware**: divider resistors, ADC reference, current sensor transfer
//! - **Limits**: calibration ranges and defaults, thermal thresholds
//! - **Sampling**: RMS window, settle delay, log sizing and interval
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Runtime-tunable values (calibration, OV/UV) only get their *defaults* here;
//!    the live values belong to [`crate::calibration::CalibrationState`]

/// Analog front-end constants (divider, ADC, current sensor).
pub mod hardware;

/// Calibration ranges/defaults and thermal thresholds.
pub mod limits;

/// RMS window, settle delay and log sizing.
pub mod sampling;

pub use hardware::{
    ADC_RESOLUTION_BITS, ADC_VREF_V, CURRENT_SCALE_A_PER_V, CURRENT_ZERO_V, DIVIDER_R_BOTTOM_OHM,
    DIVIDER_R_TOP_OHM,
};

pub use limits::{
    TEMP_SHUTDOWN_C, TEMP_WARN_C, THROTTLE_MAX_TEMP_C, THROTTLE_START_TEMP_C,
};

pub use sampling::{
    LOG_CAPACITY, LOG_INTERVAL_MS, RMS_SAMPLE_COUNT, RMS_SAMPLE_SPACING_US, SETTLE_DELAY_US,
};
