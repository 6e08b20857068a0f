//! Unit Converter
//!
//! Pure arithmetic from ADC codes to pin voltages, and from pin voltages to
//! physical quantities. No state beyond the calibration passed in; never fails.
//!
//! ```text
//! raw code ──▶ pin V = raw · VREF / (2^bits − 1)
//!                 │
//!                 ├─▶ cell V = pin V · (R_TOP + R_BOTTOM) / R_BOTTOM · cal_factor + offset
//!                 ├─▶ pack V = pin V · (R_TOP + R_BOTTOM) / R_BOTTOM
//!                 └─▶ current = (pin V − I_ZERO) · I_SCALE
//! ```

use crate::calibration::CalibrationState;
use crate::constants::hardware::*;

/// Full-scale code for a converter of `resolution_bits`, taken as 1..=31
pub fn adc_max(resolution_bits: u8) -> f32 {
    let bits = u32::from(resolution_bits.clamp(1, 31));
    ((1u32 << bits) - 1) as f32
}

/// Pin voltage for a raw code at the default 12-bit resolution
pub fn raw_to_pin_voltage(raw: u16) -> f32 {
    raw_to_pin_voltage_with(raw, ADC_RESOLUTION_BITS)
}

/// Pin voltage for a raw code at an explicit resolution
pub fn raw_to_pin_voltage_with(raw: u16, resolution_bits: u8) -> f32 {
    (f32::from(raw) * ADC_VREF_V) / adc_max(resolution_bits)
}

/// Calibrated cell voltage (V)
pub fn to_cell_voltage(pin_voltage: f32, calibration: &CalibrationState) -> f32 {
    (pin_voltage * (DIVIDER_R_TOP_OHM + DIVIDER_R_BOTTOM_OHM) / DIVIDER_R_BOTTOM_OHM
        * calibration.cal_factor())
        + calibration.voltage_offset()
}

/// Uncalibrated pack voltage (V)
pub fn to_pack_voltage(pin_voltage: f32) -> f32 {
    pin_voltage * (DIVIDER_R_TOP_OHM + DIVIDER_R_BOTTOM_OHM) / DIVIDER_R_BOTTOM_OHM
}

/// Pack current (A); negative when the sensor reads below its zero bias
pub fn to_current(pin_voltage: f32) -> f32 {
    (pin_voltage - CURRENT_ZERO_V) * CURRENT_SCALE_A_PER_V
}
