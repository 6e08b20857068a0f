//! Calibration & Threshold Store
//!
//! Runtime-tunable parameters of the monitor: the multiplicative calibration
//! factor and additive offset applied to cell voltage, and the OV/UV limits.
//!
//! ## Mutation Rules
//!
//! There are exactly two ways to change a field, and they differ at the edges:
//!
//! | Operation        | Out-of-range input          |
//! |------------------|-----------------------------|
//! | [`set_absolute`] | rejected, value unchanged   |
//! | [`apply_delta`]  | clamped to the closed range |
//!
//! A clamped value may sit exactly on a bound that an absolute set would have
//! refused (`CAL +5` lands on 2.0, `SETCAL 2.0` is rejected).
//!
//! [`set_absolute`]: CalibrationState::set_absolute
//! [`apply_delta`]: CalibrationState::apply_delta

use crate::constants::limits::*;
use crate::errors::{CellGuardError, CellGuardResult};

/// Valid interval for a calibration field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
    /// Whether absolute sets may land exactly on a bound
    pub inclusive: bool,
}

impl ParamRange {
    /// Open interval `(min, max)`
    pub const fn open(min: f32, max: f32) -> Self {
        Self { min, max, inclusive: false }
    }

    /// Closed interval `[min, max]`
    pub const fn closed(min: f32, max: f32) -> Self {
        Self { min, max, inclusive: true }
    }

    /// Check membership; NaN is never contained
    pub fn contains(&self, value: f32) -> bool {
        if self.inclusive {
            value >= self.min && value <= self.max
        } else {
            value > self.min && value < self.max
        }
    }

    /// Clamp into `[min, max]`
    ///
    /// NaN clamps to `min` so the store never holds an undefined value.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Selects one field of [`CalibrationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationField {
    /// Multiplicative cell-voltage correction
    CalFactor,
    /// Additive cell-voltage correction (V)
    VoltageOffset,
    /// Over-voltage threshold (V)
    OvLimit,
    /// Under-voltage threshold (V)
    UvLimit,
}

impl CalibrationField {
    /// All fields, in display order
    pub const ALL: [CalibrationField; 4] = [
        CalibrationField::CalFactor,
        CalibrationField::VoltageOffset,
        CalibrationField::OvLimit,
        CalibrationField::UvLimit,
    ];

    /// Declared valid range of the field
    pub const fn range(self) -> ParamRange {
        match self {
            CalibrationField::CalFactor => ParamRange::open(CAL_FACTOR_MIN, CAL_FACTOR_MAX),
            CalibrationField::VoltageOffset => {
                ParamRange::closed(VOLTAGE_OFFSET_MIN_V, VOLTAGE_OFFSET_MAX_V)
            }
            CalibrationField::OvLimit => ParamRange::open(OV_LIMIT_MIN_V, OV_LIMIT_MAX_V),
            CalibrationField::UvLimit => ParamRange::open(UV_LIMIT_MIN_V, UV_LIMIT_MAX_V),
        }
    }

    /// Field name as shown to the operator
    pub const fn name(self) -> &'static str {
        match self {
            CalibrationField::CalFactor => "cal_factor",
            CalibrationField::VoltageOffset => "voltage_offset",
            CalibrationField::OvLimit => "ov_limit",
            CalibrationField::UvLimit => "uv_limit",
        }
    }
}

/// Live calibration and threshold values
///
/// Fields are private: every value reaching this struct has gone through
/// [`set_absolute`](Self::set_absolute) or [`apply_delta`](Self::apply_delta),
/// so each one lies within its field's range at all times.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CalibrationState {
    cal_factor: f32,
    voltage_offset: f32,
    ov_limit: f32,
    uv_limit: f32,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            cal_factor: CAL_FACTOR_DEFAULT,
            voltage_offset: VOLTAGE_OFFSET_DEFAULT_V,
            ov_limit: OV_LIMIT_DEFAULT_V,
            uv_limit: UV_LIMIT_DEFAULT_V,
        }
    }
}

impl CalibrationState {
    /// Build a state from explicit values, validating each one
    pub fn try_new(
        cal_factor: f32,
        voltage_offset: f32,
        ov_limit: f32,
        uv_limit: f32,
    ) -> CellGuardResult<Self> {
        let mut state = Self::default();
        state.set_absolute(CalibrationField::CalFactor, cal_factor)?;
        state.set_absolute(CalibrationField::VoltageOffset, voltage_offset)?;
        state.set_absolute(CalibrationField::OvLimit, ov_limit)?;
        state.set_absolute(CalibrationField::UvLimit, uv_limit)?;
        Ok(state)
    }

    pub fn cal_factor(&self) -> f32 {
        self.cal_factor
    }

    pub fn voltage_offset(&self) -> f32 {
        self.voltage_offset
    }

    pub fn ov_limit(&self) -> f32 {
        self.ov_limit
    }

    pub fn uv_limit(&self) -> f32 {
        self.uv_limit
    }

    /// Current value of `field`
    pub fn get(&self, field: CalibrationField) -> f32 {
        match field {
            CalibrationField::CalFactor => self.cal_factor,
            CalibrationField::VoltageOffset => self.voltage_offset,
            CalibrationField::OvLimit => self.ov_limit,
            CalibrationField::UvLimit => self.uv_limit,
        }
    }

    fn slot(&mut self, field: CalibrationField) -> &mut f32 {
        match field {
            CalibrationField::CalFactor => &mut self.cal_factor,
            CalibrationField::VoltageOffset => &mut self.voltage_offset,
            CalibrationField::OvLimit => &mut self.ov_limit,
            CalibrationField::UvLimit => &mut self.uv_limit,
        }
    }

    /// Store `value` if it lies within the field's range
    ///
    /// Returns the stored value. Out-of-range (or NaN) values are rejected
    /// with [`CellGuardError::OutOfRange`] and nothing changes.
    pub fn set_absolute(&mut self, field: CalibrationField, value: f32) -> CellGuardResult<f32> {
        let range = field.range();
        if !range.contains(value) {
            log_warn!("rejected {} = {} (range {}..{})", field.name(), value, range.min, range.max);
            return Err(CellGuardError::OutOfRange {
                field,
                value,
                min: range.min,
                max: range.max,
            });
        }

        *self.slot(field) = value;
        log_info!("{} set to {}", field.name(), value);
        Ok(value)
    }

    /// Add `delta` to the field and clamp the result into its closed range
    ///
    /// Always succeeds and returns the value after clamping.
    pub fn apply_delta(&mut self, field: CalibrationField, delta: f32) -> f32 {
        let range = field.range();
        let slot = self.slot(field);
        *slot = range.clamp(*slot + delta);
        let value = *slot;
        log_info!("{} adjusted by {} to {}", field.name(), delta, value);
        value
    }
}
