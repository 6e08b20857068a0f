//! Measurement core for CellGuard single-cell battery monitors
//!
//! Turns raw ADC samples into calibrated cell/pack readings, raises
//! over/under-voltage and thermal flags, derives a throttle factor, and keeps
//! a bounded history of valid snapshots that a line-oriented command
//! interface can query and recalibrate.
//!
//! Key constraints:
//! - Runs without an allocator (`no_std` with `default-features = false`)
//! - Fixed-capacity history, no heap in the cycle
//! - Hardware reached only through the capability traits in [`traits`]
//!
//! ```no_run
//! use cellguard_core::{Monitor, SnapshotBuilder, FixedTime};
//! # use cellguard_core::traits::{Channel, SampleSource, Delay};
//! # struct Adc;
//! # impl SampleSource for Adc {
//! #     type Error = core::convert::Infallible;
//! #     fn select(&mut self, _: Channel) {}
//! #     fn read(&mut self) -> nb::Result<u16, Self::Error> { Ok(1900) }
//! # }
//! # struct Spin;
//! # impl Delay for Spin { fn delay(&mut self, _: fugit::MicrosDurationU32) {} }
//!
//! let builder = SnapshotBuilder::new(Adc, || true, || 25.0_f32, Spin);
//! let mut monitor: Monitor<_, _, _, _, _, 100> = Monitor::new(builder, FixedTime::new(0));
//!
//! monitor.run_cycle().ok();
//! let _ = monitor.handle_line("READ");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod calibration;
pub mod command;
pub mod config;
pub mod constants;
pub mod convert;
pub mod errors;
pub mod faults;
pub mod history;
pub mod monitor;
pub mod rms;
pub mod snapshot;
pub mod time;
pub mod traits;
pub mod transport;

// Public API
pub use calibration::{CalibrationField, CalibrationState, ParamRange};
pub use command::{dispatch, execute, Command, LogQuery, Response, HELP};
pub use config::{InitialCalibration, MonitorConfig};
pub use errors::{CellGuardError, CellGuardResult};
pub use faults::{FaultFlags, ThermalPolicy};
pub use history::{CircularLog, LogEntry, LogIter, LogStatistics, Summary};
pub use monitor::{CycleOutcome, IndicatorState, Monitor};
pub use rms::RmsWindow;
pub use snapshot::{Snapshot, SnapshotBuilder};
pub use time::{FixedTime, Timestamp};
pub use transport::{CommandLine, LineAssembler};

#[cfg(feature = "std")]
pub use time::MonotonicTime;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
