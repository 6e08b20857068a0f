//! Runtime configuration of the monitor
//!
//! Plain numbers so the struct deserialises from any serde format; typed
//! accessors turn them into `fugit` durations and validated state.
//!
//! ```rust
//! use cellguard_core::config::MonitorConfig;
//!
//! let config = MonitorConfig::default()
//!     .with_log_interval_ms(500)
//!     .with_rms_samples(50);
//!
//! assert_eq!(config.rms_window().unwrap().duration().to_micros(), 2500);
//! ```

use core::num::NonZeroU16;

use fugit::{MicrosDurationU32, MillisDurationU32};

use crate::calibration::CalibrationState;
use crate::constants::limits::*;
use crate::constants::sampling::*;
use crate::errors::{CellGuardError, CellGuardResult};
use crate::faults::ThermalPolicy;
use crate::rms::RmsWindow;

/// Boot values for the calibration store
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InitialCalibration {
    pub cal_factor: f32,
    pub voltage_offset: f32,
    pub ov_limit: f32,
    pub uv_limit: f32,
}

impl Default for InitialCalibration {
    fn default() -> Self {
        Self {
            cal_factor: CAL_FACTOR_DEFAULT,
            voltage_offset: VOLTAGE_OFFSET_DEFAULT_V,
            ov_limit: OV_LIMIT_DEFAULT_V,
            uv_limit: UV_LIMIT_DEFAULT_V,
        }
    }
}

/// Sampling, logging, thermal and calibration settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorConfig {
    /// Samples per RMS window (must be non-zero)
    pub rms_samples: u16,
    /// Spacing between RMS samples (µs)
    pub rms_spacing_us: u32,
    /// Wait between channel switch and instantaneous read (µs)
    pub settle_us: u32,
    /// Cycle period and energy time slice (ms)
    pub log_interval_ms: u32,
    pub thermal: ThermalPolicy,
    pub calibration: InitialCalibration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rms_samples: RMS_SAMPLE_COUNT,
            rms_spacing_us: RMS_SAMPLE_SPACING_US,
            settle_us: SETTLE_DELAY_US,
            log_interval_ms: LOG_INTERVAL_MS,
            thermal: ThermalPolicy::DEFAULT,
            calibration: InitialCalibration::default(),
        }
    }
}

impl MonitorConfig {
    pub fn with_rms_samples(mut self, samples: u16) -> Self {
        self.rms_samples = samples;
        self
    }

    pub fn with_rms_spacing_us(mut self, spacing_us: u32) -> Self {
        self.rms_spacing_us = spacing_us;
        self
    }

    pub fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }

    pub fn with_log_interval_ms(mut self, interval_ms: u32) -> Self {
        self.log_interval_ms = interval_ms;
        self
    }

    pub fn with_thermal(mut self, thermal: ThermalPolicy) -> Self {
        self.thermal = thermal;
        self
    }

    pub fn with_calibration(mut self, calibration: InitialCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// RMS window; zero samples is an `InvalidNumber`
    pub fn rms_window(&self) -> CellGuardResult<RmsWindow> {
        let samples = NonZeroU16::new(self.rms_samples).ok_or(CellGuardError::InvalidNumber)?;
        Ok(RmsWindow::new(samples, MicrosDurationU32::micros(self.rms_spacing_us)))
    }

    pub fn settle(&self) -> MicrosDurationU32 {
        MicrosDurationU32::micros(self.settle_us)
    }

    pub fn log_interval(&self) -> MillisDurationU32 {
        MillisDurationU32::millis(self.log_interval_ms)
    }

    /// Calibration store seeded from this config, through the range-checked setters
    pub fn calibration_state(&self) -> CellGuardResult<CalibrationState> {
        let c = &self.calibration;
        CalibrationState::try_new(c.cal_factor, c.voltage_offset, c.ov_limit, c.uv_limit)
    }

    /// Check every derived value once, up front
    pub fn validate(&self) -> CellGuardResult<()> {
        self.rms_window()?;
        self.calibration_state()?;
        if self.log_interval_ms == 0
            || !(self.thermal.throttle_start_c < self.thermal.throttle_max_c)
        {
            return Err(CellGuardError::InvalidNumber);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationField;

    #[test]
    fn defaults_validate() {
        assert_eq!(MonitorConfig::default().validate(), Ok(()));
        assert_eq!(MonitorConfig::default().log_interval().to_millis(), 1000);
        assert_eq!(MonitorConfig::default().settle().to_micros(), 10);
    }

    #[test]
    fn zero_samples_rejected() {
        let config = MonitorConfig::default().with_rms_samples(0);
        assert_eq!(config.rms_window(), Err(CellGuardError::InvalidNumber));
    }

    #[test]
    fn out_of_range_calibration_rejected() {
        let config = MonitorConfig::default().with_calibration(InitialCalibration {
            ov_limit: 5.5,
            ..InitialCalibration::default()
        });
        assert!(matches!(
            config.validate(),
            Err(CellGuardError::OutOfRange { field: CalibrationField::OvLimit, .. })
        ));
    }

    #[test]
    fn inverted_throttle_curve_rejected() {
        let thermal = ThermalPolicy { throttle_start_c: 60.0, throttle_max_c: 50.0, ..ThermalPolicy::DEFAULT };
        assert!(MonitorConfig::default().with_thermal(thermal).validate().is_err());
    }
}
