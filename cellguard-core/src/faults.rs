//! Fault & Throttle Evaluator
//!
//! Pure comparisons of converted values against thresholds.
//!
//! - OV/UV use the live [`CalibrationState`] limits with strict inequality:
//!   a cell sitting exactly on a limit is not flagged.
//! - Thermal warn and fault are independent; above the shutdown threshold
//!   both are reported.
//! - The throttle factor is a piecewise-linear derating curve. It is advisory
//!   telemetry: nothing in this crate applies it to hardware.
//!
//! ```text
//! factor
//!  1.0 ┤━━━━━━━━━┓
//!      │          ╲
//!  0.5 ┤           ╲
//!      │            ╲
//!  0.0 ┤             ┗━━━━━━━━
//!      └────────┬─────┬──────▶ °C
//!              45    55
//! ```

use crate::calibration::CalibrationState;
use crate::constants::limits::{
    TEMP_SHUTDOWN_C, TEMP_WARN_C, THROTTLE_MAX_TEMP_C, THROTTLE_START_TEMP_C,
};

/// Over/under-voltage flags for one cell reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoltageFlags {
    pub ov: bool,
    pub uv: bool,
}

/// Thermal flags for one temperature reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThermalFlags {
    pub warn: bool,
    pub fault: bool,
}

/// All four fault flags of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultFlags {
    pub ov: bool,
    pub uv: bool,
    pub thermal_warn: bool,
    pub thermal_fault: bool,
}

impl FaultFlags {
    pub fn new(voltage: VoltageFlags, thermal: ThermalFlags) -> Self {
        Self {
            ov: voltage.ov,
            uv: voltage.uv,
            thermal_warn: thermal.warn,
            thermal_fault: thermal.fault,
        }
    }

    /// `true` when any flag is raised; this is what counts as a fault event
    pub fn any(&self) -> bool {
        self.ov || self.uv || self.thermal_warn || self.thermal_fault
    }
}

/// Thermal thresholds and derating curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThermalPolicy {
    /// Warning above this temperature (°C)
    pub warn_c: f32,
    /// Shutdown fault above this temperature (°C)
    pub shutdown_c: f32,
    /// Derating starts here (°C)
    pub throttle_start_c: f32,
    /// Full cutoff from here on (°C)
    pub throttle_max_c: f32,
}

impl Default for ThermalPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ThermalPolicy {
    /// Reference thresholds: warn 50, shutdown 60, derate 45..55 °C
    pub const DEFAULT: Self = Self {
        warn_c: TEMP_WARN_C,
        shutdown_c: TEMP_SHUTDOWN_C,
        throttle_start_c: THROTTLE_START_TEMP_C,
        throttle_max_c: THROTTLE_MAX_TEMP_C,
    };

    pub fn evaluate(&self, cell_temp: f32) -> ThermalFlags {
        ThermalFlags {
            warn: cell_temp > self.warn_c,
            fault: cell_temp > self.shutdown_c,
        }
    }

    /// Derating factor in `[0, 1]`; an unreadable (NaN) temperature derates fully
    pub fn throttle_factor(&self, cell_temp: f32) -> f32 {
        if cell_temp < self.throttle_start_c {
            return 1.0;
        }
        if !(cell_temp < self.throttle_max_c) {
            return 0.0;
        }

        let range = self.throttle_max_c - self.throttle_start_c;
        1.0 - ((cell_temp - self.throttle_start_c) / range)
    }
}

/// OV/UV flags against the live limits
pub fn evaluate_flags(cell_voltage: f32, calibration: &CalibrationState) -> VoltageFlags {
    VoltageFlags {
        ov: cell_voltage > calibration.ov_limit(),
        uv: cell_voltage < calibration.uv_limit(),
    }
}

/// Thermal flags with the reference thresholds
pub fn evaluate_thermal(cell_temp: f32) -> ThermalFlags {
    ThermalPolicy::DEFAULT.evaluate(cell_temp)
}

/// Throttle factor with the reference derating curve
pub fn throttle_factor(cell_temp: f32) -> f32 {
    ThermalPolicy::DEFAULT.throttle_factor(cell_temp)
}
