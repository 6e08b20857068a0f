//! Shared fixtures for the integration tests
//!
//! - [`ChannelAdc`] returns a fixed raw code per channel
//! - [`NoDelay`] skips settle and spacing delays
//! - [`raw_for_cell_voltage`] inverts the divider for readable test setups

#![allow(dead_code)]

use core::cell::Cell;
use core::convert::Infallible;

use cellguard_core::constants::hardware::{ADC_VREF_V, DIVIDER_RATIO};
use cellguard_core::traits::{Channel, Delay, SampleSource};
use cellguard_core::SnapshotBuilder;

/// Raw code putting the current sensor pin at its zero bias
pub const RAW_ZERO_CURRENT: u16 = 2048;

/// ADC stand-in with one constant code per channel
#[derive(Debug, Clone)]
pub struct ChannelAdc {
    codes: [u16; 3],
    selected: Channel,
    pub selects: usize,
    pub reads: usize,
}

impl ChannelAdc {
    pub fn new(cell: u16, pack: u16, current: u16) -> Self {
        Self {
            codes: [cell, pack, current],
            selected: Channel::CellVoltage,
            selects: 0,
            reads: 0,
        }
    }

    /// Healthy cell around 3.78 V, same pack reading, zero current
    pub fn healthy() -> Self {
        Self::new(1500, 1500, RAW_ZERO_CURRENT)
    }

    pub fn set_code(&mut self, channel: Channel, code: u16) {
        self.codes[usize::from(channel.input())] = code;
    }
}

impl SampleSource for ChannelAdc {
    type Error = Infallible;

    fn select(&mut self, channel: Channel) {
        self.selected = channel;
        self.selects += 1;
    }

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        self.reads += 1;
        Ok(self.codes[usize::from(self.selected.input())])
    }
}

pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&mut self, _duration: fugit::MicrosDurationU32) {}
}

/// Nearest 12-bit code for a cell voltage at default calibration
pub fn raw_for_cell_voltage(volts: f32) -> u16 {
    let pin = volts / DIVIDER_RATIO;
    (pin / ADC_VREF_V * 4095.0).round() as u16
}

/// Builder wired to externally controlled validity and temperature cells
pub fn builder<'a>(
    adc: ChannelAdc,
    valid: &'a Cell<bool>,
    temperature: &'a Cell<f32>,
) -> SnapshotBuilder<ChannelAdc, impl FnMut() -> bool + 'a, impl FnMut() -> f32 + 'a, NoDelay> {
    SnapshotBuilder::new(adc, move || valid.get(), move || temperature.get(), NoDelay)
}

pub fn approx(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}
