//! Analog Front-End Constants
//!
//! Fixed values of the measurement hardware. Changing any of these means the
//! board changed, not the calibration.

// ===== VOLTAGE DIVIDER =====

/// Upper divider resistor (Ω).
///
/// Sits between the measured node and the ADC pin.
pub const DIVIDER_R_TOP_OHM: f32 = 100_000.0;

/// Lower divider resistor (Ω).
///
/// Sits between the ADC pin and ground.
pub const DIVIDER_R_BOTTOM_OHM: f32 = 47_000.0;

/// Divider ratio `(R_TOP + R_BOTTOM) / R_BOTTOM` (dimensionless).
///
/// Multiply a pin voltage by this to recover the node voltage (≈3.128).
pub const DIVIDER_RATIO: f32 = (DIVIDER_R_TOP_OHM + DIVIDER_R_BOTTOM_OHM) / DIVIDER_R_BOTTOM_OHM;

// ===== ADC =====

/// ADC reference voltage (V).
pub const ADC_VREF_V: f32 = 3.3;

/// Default ADC resolution (bits).
///
/// Full scale code is `2^bits - 1` (4095 for 12-bit).
pub const ADC_RESOLUTION_BITS: u8 = 12;

// ===== CURRENT SENSOR =====

/// Pin voltage reported by the Hall current sensor at zero current (V).
///
/// Mid-rail bias of a 3.3 V bidirectional sensor.
pub const CURRENT_ZERO_V: f32 = 1.65;

/// Current sensor transfer coefficient (A per V of pin deviation).
pub const CURRENT_SCALE_A_PER_V: f32 = 30.3;
