//! Capability Traits for the Measurement Core
//!
//! The core never touches hardware directly. Everything it needs from the
//! outside world comes through the traits in this module, so the same code
//! runs against an ADC peripheral, a host simulator, or a scripted test double.
//!
//! ## Module Organization
//!
//! - [`acquisition`] - sample source, data-validity gate, thermometer, status indicator
//! - [`time`] - monotonic clock and blocking delay
//!
//! ## Usage Example
//!
//! ```rust
//! use cellguard_core::traits::{Channel, SampleSource};
//!
//! /// ADC that always reads mid-scale
//! struct MidScale;
//!
//! impl SampleSource for MidScale {
//!     type Error = core::convert::Infallible;
//!
//!     fn select(&mut self, _channel: Channel) {}
//!
//!     fn read(&mut self) -> nb::Result<u16, Self::Error> {
//!         Ok(2048)
//!     }
//! }
//! ```

pub mod acquisition;
pub mod time;

pub use acquisition::{Channel, DataValidity, SampleSource, StatusIndicator, Thermometer};
pub use time::{Delay, TimeSource};
