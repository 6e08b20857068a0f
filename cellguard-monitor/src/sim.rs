//! Simulated hardware for running the monitor on a desktop
//!
//! Generates slowly varying cell, pack and current signals with a little
//! noise, a flaky data-validity line and a temperature that drifts through
//! the derating band, so every report path shows up within a few minutes.

use std::convert::Infallible;
use std::f32::consts::TAU;
use std::time::Instant;

use cellguard_core::constants::hardware::{ADC_VREF_V, CURRENT_SCALE_A_PER_V, CURRENT_ZERO_V, DIVIDER_RATIO};
use cellguard_core::convert::adc_max;
use cellguard_core::traits::{Channel, DataValidity, Delay, SampleSource, StatusIndicator, Thermometer};
use fugit::MicrosDurationU32;
use log::debug;

/// Percent of cycles the validity line reports usable data
const VALID_PERCENT: u32 = 80;

/// Seconds per full swing of the simulated cell voltage
const VOLTAGE_PERIOD_S: f32 = 240.0;

/// Seconds per full swing of the simulated temperature
const TEMPERATURE_PERIOD_S: f32 = 600.0;

/// Small xorshift generator; deterministic for a given seed
#[derive(Debug, Clone)]
pub struct XorShift32(u32);

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform in `[-1, 1]`
    pub fn next_signed(&mut self) -> f32 {
        (self.next_u32() as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

/// Three-channel ADC producing codes for a synthetic cell
pub struct SimulatedAdc {
    selected: Channel,
    elapsed_s: f32,
    rng: XorShift32,
}

impl SimulatedAdc {
    pub fn new(seed: u32) -> Self {
        Self { selected: Channel::CellVoltage, elapsed_s: 0.0, rng: XorShift32::new(seed) }
    }

    /// Move the simulated signals forward
    pub fn advance(&mut self, dt_s: f32) {
        self.elapsed_s += dt_s;
    }

    fn cell_voltage(&self) -> f32 {
        // 2.9 V .. 4.3 V so both limits get crossed
        3.6 + 0.7 * (TAU * self.elapsed_s / VOLTAGE_PERIOD_S).sin()
    }

    fn current(&self) -> f32 {
        1.5 + 0.5 * (TAU * self.elapsed_s / 30.0).sin()
    }

    fn pin_voltage(&mut self, channel: Channel) -> f32 {
        let noise = 0.002 * self.rng.next_signed();
        let pin = match channel {
            Channel::CellVoltage | Channel::PackVoltage => self.cell_voltage() / DIVIDER_RATIO,
            Channel::PackCurrent => CURRENT_ZERO_V + self.current() / CURRENT_SCALE_A_PER_V,
        };
        pin + noise
    }
}

impl SampleSource for SimulatedAdc {
    type Error = Infallible;

    fn select(&mut self, channel: Channel) {
        self.selected = channel;
    }

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        let full_scale = adc_max(self.resolution_bits());
        let pin = self.pin_voltage(self.selected).clamp(0.0, ADC_VREF_V);
        Ok((pin / ADC_VREF_V * full_scale).round() as u16)
    }
}

/// Validity line that drops out on a fixed share of cycles
pub struct SimulatedValidity {
    rng: XorShift32,
}

impl SimulatedValidity {
    pub fn new(seed: u32) -> Self {
        Self { rng: XorShift32::new(seed) }
    }
}

impl DataValidity for SimulatedValidity {
    fn is_data_valid(&mut self) -> bool {
        self.rng.next_u32() % 100 < VALID_PERCENT
    }
}

/// Temperature drifting between 30 °C and 62 °C, one step per reading
pub struct SimulatedThermometer {
    readings: u32,
    step_s: f32,
}

impl SimulatedThermometer {
    pub fn new(step_s: f32) -> Self {
        Self { readings: 0, step_s }
    }
}

impl Thermometer for SimulatedThermometer {
    fn read_celsius(&mut self) -> f32 {
        let t = self.readings as f32 * self.step_s;
        self.readings = self.readings.wrapping_add(1);
        46.0 - 16.0 * (TAU * t / TEMPERATURE_PERIOD_S).cos()
    }
}

/// Busy-wait delay for the settle and sampling waits
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay(&mut self, duration: MicrosDurationU32) {
        let start = Instant::now();
        let wait = std::time::Duration::from_micros(u64::from(duration.to_micros()));
        while start.elapsed() < wait {
            std::hint::spin_loop();
        }
    }
}

/// Status LED stand-in; level changes go to the debug log
#[derive(Debug, Default)]
pub struct ConsoleIndicator {
    level: Option<bool>,
}

impl ConsoleIndicator {
    pub fn level(&self) -> Option<bool> {
        self.level
    }
}

impl StatusIndicator for ConsoleIndicator {
    fn set_level(&mut self, on: bool) {
        if self.level != Some(on) {
            debug!("status LED {}", if on { "on" } else { "off" });
        }
        self.level = Some(on);
    }
}
