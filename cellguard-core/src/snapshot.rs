//! Snapshot Builder
//!
//! Produces one immutable [`Snapshot`] per control cycle by orchestrating the
//! converter, the RMS engine and the evaluator against the injected hardware
//! capabilities.
//!
//! ## Cycle Sequence
//!
//! 1. Ask the validity gate. If it refuses, return the previous snapshot's
//!    values with `data_valid = false` and stop. Callers must not log it.
//! 2. Cell voltage: select, settle, one instantaneous read (also kept as the
//!    diagnostic pin voltage), then the RMS window.
//! 3. Pack voltage and pack current: same pattern, uncalibrated.
//! 4. Power: instantaneous `V·I`, then the paired power RMS window.
//! 5. Temperature, flags, throttle factor.
//!
//! The only blocking is the fixed settle and RMS spacing delays.

use fugit::MicrosDurationU32;

use crate::calibration::CalibrationState;
use crate::constants::sampling::SETTLE_DELAY_US;
use crate::convert::{raw_to_pin_voltage_with, to_cell_voltage, to_current, to_pack_voltage};
use crate::faults::{evaluate_flags, FaultFlags, ThermalPolicy};
use crate::rms::{sample_power_rms, sample_rms, RmsWindow};
use crate::traits::{Channel, DataValidity, Delay, SampleSource, Thermometer};

/// Result of one measurement cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    /// Instantaneous calibrated cell voltage (V)
    pub cell_v: f32,
    /// RMS calibrated cell voltage (V)
    pub cell_v_rms: f32,
    /// Cell temperature (°C)
    pub cell_temp_c: f32,
    /// Instantaneous pack voltage (V)
    pub pack_v: f32,
    /// RMS pack voltage (V)
    pub pack_v_rms: f32,
    /// Instantaneous pack current (A)
    pub pack_i: f32,
    /// RMS pack current (A)
    pub pack_i_rms: f32,
    /// Instantaneous pack power, `pack_v · pack_i` (W)
    pub pack_power: f32,
    /// RMS of paired instantaneous power (W)
    pub pack_power_rms: f32,
    /// Advisory derating factor, 0.0..=1.0
    pub throttle_factor: f32,
    pub ov_flag: bool,
    pub uv_flag: bool,
    pub t_warn: bool,
    pub t_fault: bool,
    /// Whether the acquisition gate accepted this cycle
    pub data_valid: bool,
    /// Raw cell pin voltage of the instantaneous read (V), for diagnostics
    pub voltage_pin: f32,
}

impl Snapshot {
    pub fn flags(&self) -> FaultFlags {
        FaultFlags {
            ov: self.ov_flag,
            uv: self.uv_flag,
            thermal_warn: self.t_warn,
            thermal_fault: self.t_fault,
        }
    }
}

/// Drives the hardware capabilities through one measurement cycle
pub struct SnapshotBuilder<S, V, T, D> {
    source: S,
    validity: V,
    thermometer: T,
    delay: D,
    window: RmsWindow,
    settle: MicrosDurationU32,
    thermal: ThermalPolicy,
}

impl<S, V, T, D> SnapshotBuilder<S, V, T, D>
where
    S: SampleSource,
    V: DataValidity,
    T: Thermometer,
    D: Delay,
{
    /// Builder with the reference RMS window, settle delay and thermal policy
    pub fn new(source: S, validity: V, thermometer: T, delay: D) -> Self {
        Self {
            source,
            validity,
            thermometer,
            delay,
            window: RmsWindow::default(),
            settle: MicrosDurationU32::micros(SETTLE_DELAY_US),
            thermal: ThermalPolicy::DEFAULT,
        }
    }

    pub fn with_window(mut self, window: RmsWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_settle(mut self, settle: MicrosDurationU32) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_thermal_policy(mut self, thermal: ThermalPolicy) -> Self {
        self.thermal = thermal;
        self
    }

    pub fn window(&self) -> RmsWindow {
        self.window
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn read_instant(&mut self, channel: Channel) -> Result<f32, S::Error> {
        self.source.select(channel);
        self.delay.delay(self.settle);
        let raw = nb::block!(self.source.read())?;
        let pin = raw_to_pin_voltage_with(raw, self.source.resolution_bits());
        log_debug!("{} raw {} pin {} V", channel.name(), raw, pin);
        Ok(pin)
    }

    /// Measure one cycle
    ///
    /// `previous` supplies the values carried into an invalid snapshot.
    pub fn build_snapshot(
        &mut self,
        previous: &Snapshot,
        calibration: &CalibrationState,
    ) -> Result<Snapshot, S::Error> {
        if !self.validity.is_data_valid() {
            log_warn!("acquisition data not valid, cycle skipped");
            return Ok(Snapshot { data_valid: false, ..*previous });
        }

        let window = self.window;

        let voltage_pin = self.read_instant(Channel::CellVoltage)?;
        let cell_v = to_cell_voltage(voltage_pin, calibration);
        let cell_v_rms = sample_rms(
            &mut self.source,
            &mut self.delay,
            Channel::CellVoltage,
            window,
            |pin| to_cell_voltage(pin, calibration),
        )?;

        let pack_v = to_pack_voltage(self.read_instant(Channel::PackVoltage)?);
        let pack_v_rms = sample_rms(
            &mut self.source,
            &mut self.delay,
            Channel::PackVoltage,
            window,
            to_pack_voltage,
        )?;

        let pack_i = to_current(self.read_instant(Channel::PackCurrent)?);
        let pack_i_rms = sample_rms(
            &mut self.source,
            &mut self.delay,
            Channel::PackCurrent,
            window,
            to_current,
        )?;

        let pack_power = pack_v * pack_i;
        let pack_power_rms = sample_power_rms(&mut self.source, &mut self.delay, window)?;

        let cell_temp_c = self.thermometer.read_celsius();
        let voltage = evaluate_flags(cell_v, calibration);
        let thermal = self.thermal.evaluate(cell_temp_c);

        Ok(Snapshot {
            cell_v,
            cell_v_rms,
            cell_temp_c,
            pack_v,
            pack_v_rms,
            pack_i,
            pack_i_rms,
            pack_power,
            pack_power_rms,
            throttle_factor: self.thermal.throttle_factor(cell_temp_c),
            ov_flag: voltage.ov,
            uv_flag: voltage.uv,
            t_warn: thermal.warn,
            t_fault: thermal.fault,
            data_valid: true,
            voltage_pin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use core::num::NonZeroU16;

    /// Same code on every channel, except current which sits at its bias
    struct Flat {
        selected: Channel,
        cell: u16,
        pack: u16,
        current: u16,
        reads: usize,
    }

    impl SampleSource for Flat {
        type Error = Infallible;

        fn select(&mut self, channel: Channel) {
            self.selected = channel;
        }

        fn read(&mut self) -> nb::Result<u16, Infallible> {
            self.reads += 1;
            Ok(match self.selected {
                Channel::CellVoltage => self.cell,
                Channel::PackVoltage => self.pack,
                Channel::PackCurrent => self.current,
            })
        }
    }

    struct NoDelay;

    impl Delay for NoDelay {
        fn delay(&mut self, _duration: MicrosDurationU32) {}
    }

    fn flat(cell: u16, pack: u16, current: u16) -> Flat {
        Flat { selected: Channel::CellVoltage, cell, pack, current, reads: 0 }
    }

    #[test]
    fn valid_cycle_fills_every_field() {
        let mut builder = SnapshotBuilder::new(flat(1650, 1650, 2500), || true, || 50.0f32, NoDelay)
            .with_window(RmsWindow::new(NonZeroU16::new(10).unwrap(), MicrosDurationU32::micros(50)));
        let cal = CalibrationState::default();

        let snap = builder.build_snapshot(&Snapshot::default(), &cal).unwrap();

        assert!(snap.data_valid);
        assert_eq!(snap.cell_v, to_cell_voltage(snap.voltage_pin, &cal));
        assert_eq!(snap.cell_v_rms, snap.cell_v);
        assert_eq!(snap.pack_v_rms, snap.pack_v);
        assert_eq!(snap.pack_power, snap.pack_v * snap.pack_i);
        assert!((snap.pack_power_rms - snap.pack_power.abs()).abs() < 1e-3);
        assert_eq!(snap.throttle_factor, 0.5);
        assert!(!snap.t_warn);

        // 3 instantaneous reads, 3 RMS windows, 2 reads per power iteration
        assert_eq!(builder.source().reads, 3 + 3 * 10 + 2 * 10);
    }

    #[test]
    fn invalid_cycle_keeps_previous_values() {
        let mut builder = SnapshotBuilder::new(flat(1650, 1650, 2048), || false, || 25.0f32, NoDelay);
        let previous = Snapshot { cell_v: 3.7, ov_flag: true, data_valid: true, ..Snapshot::default() };

        let snap = builder.build_snapshot(&previous, &CalibrationState::default()).unwrap();

        assert!(!snap.data_valid);
        assert_eq!(snap.cell_v, 3.7);
        assert!(snap.ov_flag);
        assert_eq!(builder.source().reads, 0);
    }

    #[test]
    fn flags_reflect_calibration_limits() {
        // 1.4 V on the pin → ≈4.38 V cell: over the 4.20 V default limit
        let mut builder = SnapshotBuilder::new(flat(1737, 1000, 2048), || true, || 62.0f32, NoDelay);
        let snap = builder.build_snapshot(&Snapshot::default(), &CalibrationState::default()).unwrap();

        assert!(snap.ov_flag);
        assert!(!snap.uv_flag);
        assert!(snap.t_warn && snap.t_fault);
        assert_eq!(snap.throttle_factor, 0.0);
        assert!(snap.flags().any());
    }
}
