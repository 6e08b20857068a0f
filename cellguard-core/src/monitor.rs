//! Cooperative monitor cycle
//!
//! Owns the calibration store, the circular log and the latest snapshot, and
//! ties them to a [`SnapshotBuilder`] and a clock. The surrounding loop is
//! single-threaded:
//!
//! ```text
//! loop {
//!     run_cycle()          // measure; log + indicator only if data valid
//!     handle_line(..)*     // every command line pending right now
//!     sleep(remaining interval)
//! }
//! ```
//!
//! Draining the transport and sleeping belong to the caller, since both
//! depend on the platform.

use crate::calibration::CalibrationState;
use crate::command::{dispatch, Response};
use crate::config::MonitorConfig;
use crate::errors::CellGuardResult;
use crate::faults::FaultFlags;
use crate::history::CircularLog;
use crate::snapshot::{Snapshot, SnapshotBuilder};
use crate::time::Timestamp;
use crate::traits::{DataValidity, Delay, SampleSource, Thermometer, TimeSource};

/// Blink-or-solid logic of the status indicator
///
/// Any raised flag toggles the output each logged cycle (blink); no flags
/// drives it solid on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorState {
    level: bool,
}

impl IndicatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next output level for `flags`
    pub fn update(&mut self, flags: FaultFlags) -> bool {
        self.level = if flags.any() { !self.level } else { true };
        self.level
    }

    pub fn level(&self) -> bool {
        self.level
    }
}

/// What one cycle produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Data valid; the snapshot was appended at `timestamp_ms`
    Logged {
        snapshot: Snapshot,
        timestamp_ms: Timestamp,
        /// Status indicator level to drive
        indicator: bool,
    },
    /// Validity gate failed; nothing was logged
    Skipped,
}

/// Measurement loop state for one cell
pub struct Monitor<S, V, T, D, C, const N: usize> {
    builder: SnapshotBuilder<S, V, T, D>,
    clock: C,
    calibration: CalibrationState,
    log: CircularLog<N>,
    latest: Snapshot,
    indicator: IndicatorState,
}

impl<S, V, T, D, C, const N: usize> Monitor<S, V, T, D, C, N>
where
    S: SampleSource,
    V: DataValidity,
    T: Thermometer,
    D: Delay,
    C: TimeSource,
{
    /// Monitor with default calibration and a reference-interval log
    pub fn new(builder: SnapshotBuilder<S, V, T, D>, clock: C) -> Self {
        Self {
            builder,
            clock,
            calibration: CalibrationState::default(),
            log: CircularLog::new(),
            latest: Snapshot::default(),
            indicator: IndicatorState::new(),
        }
    }

    /// Monitor configured from `config`; the builder is reconfigured to match
    pub fn from_config(
        builder: SnapshotBuilder<S, V, T, D>,
        clock: C,
        config: &MonitorConfig,
    ) -> CellGuardResult<Self> {
        config.validate()?;
        let builder = builder
            .with_window(config.rms_window()?)
            .with_settle(config.settle())
            .with_thermal_policy(config.thermal);

        Ok(Self {
            builder,
            clock,
            calibration: config.calibration_state()?,
            log: CircularLog::with_interval(config.log_interval_ms),
            latest: Snapshot::default(),
            indicator: IndicatorState::new(),
        })
    }

    /// Measure once; append and update the indicator only for valid data
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, S::Error> {
        let snapshot = self.builder.build_snapshot(&self.latest, &self.calibration)?;
        self.latest = snapshot;

        if !snapshot.data_valid {
            return Ok(CycleOutcome::Skipped);
        }

        let timestamp_ms = self.clock.now();
        self.log.append(snapshot, timestamp_ms);
        let indicator = self.indicator.update(snapshot.flags());

        Ok(CycleOutcome::Logged { snapshot, timestamp_ms, indicator })
    }

    /// Parse and execute one command line against this monitor's state
    pub fn handle_line(&mut self, line: &str) -> CellGuardResult<Response<'_, N>> {
        dispatch(line, &mut self.calibration, &mut self.log, &self.latest)
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn log(&self) -> &CircularLog<N> {
        &self.log
    }

    pub fn latest(&self) -> &Snapshot {
        &self.latest
    }

    pub fn indicator(&self) -> IndicatorState {
        self.indicator
    }

    pub fn builder_mut(&mut self) -> &mut SnapshotBuilder<S, V, T, D> {
        &mut self.builder
    }
}
