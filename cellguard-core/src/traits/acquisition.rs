//! Acquisition Capabilities
//!
//! Channel selection and raw reads are assumed non-reentrant: a source is
//! driven by exactly one caller, which switches channels before each block
//! of reads. The single cooperative loop guarantees this.

/// Analog channels wired to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    /// Cell voltage through the divider
    CellVoltage = 0,
    /// Pack voltage through the divider
    PackVoltage = 1,
    /// Hall current sensor output
    PackCurrent = 2,
}

impl Channel {
    /// ADC input index for this channel
    pub const fn input(self) -> u8 {
        self as u8
    }

    /// Short label used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Channel::CellVoltage => "cell_v",
            Channel::PackVoltage => "pack_v",
            Channel::PackCurrent => "pack_i",
        }
    }
}

/// Raw ADC access: pick a channel, then read codes from it
///
/// `read` follows the `nb` convention so peripherals that need polling can
/// return `WouldBlock`; the core blocks on it with `nb::block!`.
pub trait SampleSource {
    /// Error reported by the converter
    type Error: core::fmt::Debug;

    /// Route the converter to `channel`
    fn select(&mut self, channel: Channel);

    /// Read one raw code from the selected channel
    fn read(&mut self) -> nb::Result<u16, Self::Error>;

    /// Converter resolution in bits
    fn resolution_bits(&self) -> u8 {
        crate::constants::ADC_RESOLUTION_BITS
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    type Error = S::Error;

    fn select(&mut self, channel: Channel) {
        (**self).select(channel)
    }

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        (**self).read()
    }

    fn resolution_bits(&self) -> u8 {
        (**self).resolution_bits()
    }
}

/// Reports whether the acquisition front-end currently delivers usable data
pub trait DataValidity {
    /// `true` when this cycle may be measured and logged
    fn is_data_valid(&mut self) -> bool;
}

impl<F: FnMut() -> bool> DataValidity for F {
    fn is_data_valid(&mut self) -> bool {
        self()
    }
}

/// Cell temperature probe
pub trait Thermometer {
    /// Current cell temperature in °C
    fn read_celsius(&mut self) -> f32;
}

impl<F: FnMut() -> f32> Thermometer for F {
    fn read_celsius(&mut self) -> f32 {
        self()
    }
}

/// Output that visualises the fault state (an LED on the board)
pub trait StatusIndicator {
    /// Drive the indicator on (`true`) or off (`false`)
    fn set_level(&mut self, on: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_map_to_distinct_inputs_and_labels() {
        let channels = [Channel::CellVoltage, Channel::PackVoltage, Channel::PackCurrent];
        let inputs: [u8; 3] = channels.map(Channel::input);
        let names: [&str; 3] = channels.map(Channel::name);
        assert_eq!(inputs, [0, 1, 2]);
        assert_eq!(names, ["cell_v", "pack_v", "pack_i"]);
    }

    #[test]
    fn closures_act_as_capabilities() {
        let mut calls = 0;
        let mut gate = || {
            calls += 1;
            calls % 2 == 1
        };
        assert!(gate.is_data_valid());
        assert!(!gate.is_data_valid());

        let mut probe = || 42.5f32;
        assert_eq!(probe.read_celsius(), 42.5);
    }
}
