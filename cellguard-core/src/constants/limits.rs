//! Calibration Ranges and Safety Thresholds
//!
//! Ranges bound what an operator may store at runtime. Defaults are what the
//! monitor boots with.

// ===== CALIBRATION FACTOR =====

/// Lower bound of the calibration factor (exclusive for absolute sets).
pub const CAL_FACTOR_MIN: f32 = 0.5;

/// Upper bound of the calibration factor (exclusive for absolute sets).
pub const CAL_FACTOR_MAX: f32 = 2.0;

/// Boot value of the calibration factor (no correction).
pub const CAL_FACTOR_DEFAULT: f32 = 1.0;

// ===== VOLTAGE OFFSET =====

/// Lower bound of the cell voltage offset (V, inclusive).
pub const VOLTAGE_OFFSET_MIN_V: f32 = -1.0;

/// Upper bound of the cell voltage offset (V, inclusive).
pub const VOLTAGE_OFFSET_MAX_V: f32 = 1.0;

/// Boot value of the cell voltage offset (V).
pub const VOLTAGE_OFFSET_DEFAULT_V: f32 = 0.0;

// ===== OVER-VOLTAGE LIMIT =====

/// Lower bound of the OV limit (V, exclusive).
pub const OV_LIMIT_MIN_V: f32 = 2.5;

/// Upper bound of the OV limit (V, exclusive).
pub const OV_LIMIT_MAX_V: f32 = 5.0;

/// Boot OV limit (V).
///
/// Typical Li-ion charge termination voltage.
pub const OV_LIMIT_DEFAULT_V: f32 = 4.20;

// ===== UNDER-VOLTAGE LIMIT =====

/// Lower bound of the UV limit (V, exclusive).
pub const UV_LIMIT_MIN_V: f32 = 2.0;

/// Upper bound of the UV limit (V, exclusive).
pub const UV_LIMIT_MAX_V: f32 = 4.0;

/// Boot UV limit (V).
pub const UV_LIMIT_DEFAULT_V: f32 = 3.00;

// ===== THERMAL =====

/// Temperature above which the warning flag is raised (°C, strict).
pub const TEMP_WARN_C: f32 = 50.0;

/// Temperature above which the shutdown fault flag is raised (°C, strict).
pub const TEMP_SHUTDOWN_C: f32 = 60.0;

/// Derating begins at this temperature (°C). Below it the throttle factor is 1.0.
pub const THROTTLE_START_TEMP_C: f32 = 45.0;

/// Derating reaches full cutoff at this temperature (°C). At or above it the
/// throttle factor is 0.0.
pub const THROTTLE_MAX_TEMP_C: f32 = 55.0;
