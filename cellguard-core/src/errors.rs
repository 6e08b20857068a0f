//! Error Types for Commands and Acquisition Cycles
//!
//! ## Design Philosophy
//!
//! None of these errors is fatal. A rejected command leaves the calibration
//! store and the log untouched; an invalid acquisition cycle is simply not
//! logged. Callers report the error and keep cycling.
//!
//! 1. **No Heap Allocation**: the only owned text is the echoed command,
//!    held in a fixed-capacity `heapless::String`.
//! 2. **Actionable Information**: range errors carry the rejected value and
//!    the bounds so the operator sees what would have been accepted.
//!
//! ## Error Categories
//!
//! - `OutOfRange`: absolute-set value outside the field's declared range
//! - `InvalidNumber`: count argument missing or not positive, or an unusable config value
//! - `UnrecognizedCommand`: input matches no known verb
//!
//! A cycle whose validity gate fails is not an error either: the monitor
//! reports it as [`CycleOutcome::Skipped`](crate::monitor::CycleOutcome).
//! Sample-source failures are not listed here: they keep the source's own
//! error type and propagate out of the RMS engine unchanged.

use core::fmt;

use heapless::String;
use thiserror_no_std::Error;

use crate::calibration::CalibrationField;
use crate::constants::sampling::COMMAND_LINE_CAPACITY;

/// Result type for command and calibration operations
pub type CellGuardResult<T> = Result<T, CellGuardError>;

/// Errors raised by the command interface and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellGuardError {
    /// Absolute-set request outside the field's valid range
    #[error("{field} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Field the request targeted
        field: CalibrationField,
        /// Rejected value
        value: f32,
        /// Lower bound of the field
        min: f32,
        /// Upper bound of the field
        max: f32,
    },

    /// Count argument failed to parse or is not positive; unusable config number
    #[error("invalid number")]
    InvalidNumber,

    /// Input matched no known command; echoes (a prefix of) the input
    #[error("unknown command '{input}'")]
    UnrecognizedCommand {
        /// The offending line, truncated to the command buffer size
        input: String<COMMAND_LINE_CAPACITY>,
    },
}

impl CellGuardError {
    /// Build an `UnrecognizedCommand`, truncating the echo on a char boundary
    pub fn unrecognized(line: &str) -> Self {
        let mut input = String::new();
        for c in line.chars() {
            if input.push(c).is_err() {
                break;
            }
        }
        Self::UnrecognizedCommand { input }
    }
}

impl fmt::Display for CalibrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CellGuardError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { field, value, min, max } =>
                defmt::write!(fmt, "{} {} outside [{}, {}]", field.name(), value, min, max),
            Self::InvalidNumber =>
                defmt::write!(fmt, "Invalid number"),
            Self::UnrecognizedCommand { input } =>
                defmt::write!(fmt, "Unknown command '{}'", input.as_str()),
        }
    }
}
