//! RMS Sampling Engine
//!
//! Repeats acquire → convert → square over a fixed window and returns the
//! quadratic mean. Squares are accumulated in `f64` so a constant input of
//! `k` comes back as exactly `k`.
//!
//! ## Power RMS
//!
//! RMS does not distribute over multiplication: `RMS(V·I) ≠ RMS(V)·RMS(I)`
//! for varying signals. [`sample_power_rms`] therefore reads voltage and
//! current on the *same* iteration, multiplies the instantaneous pair, and
//! squares the product. Never substitute the product of two RMS values.
//!
//! ## Failure Behaviour
//!
//! Every acquired sample counts. There is no outlier rejection and no retry;
//! a broken source yields a numerically wrong result, not an error. The only
//! error path is the source's own read error, which propagates unchanged.

use core::num::NonZeroU16;

use fugit::MicrosDurationU32;

use crate::constants::sampling::{RMS_SAMPLE_COUNT, RMS_SAMPLE_SPACING_US};
use crate::convert::{raw_to_pin_voltage_with, to_current, to_pack_voltage};
use crate::traits::{Channel, Delay, SampleSource};

/// Sample count and spacing of one RMS window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmsWindow {
    /// Samples per window
    pub samples: NonZeroU16,
    /// Wait after each sample
    pub spacing: MicrosDurationU32,
}

impl Default for RmsWindow {
    fn default() -> Self {
        Self {
            samples: NonZeroU16::new(RMS_SAMPLE_COUNT).unwrap_or(NonZeroU16::MIN),
            spacing: MicrosDurationU32::micros(RMS_SAMPLE_SPACING_US),
        }
    }
}

impl RmsWindow {
    pub fn new(samples: NonZeroU16, spacing: MicrosDurationU32) -> Self {
        Self { samples, spacing }
    }

    /// Total time the window spends waiting
    pub fn duration(&self) -> MicrosDurationU32 {
        MicrosDurationU32::micros(self.spacing.to_micros() * u32::from(self.samples.get()))
    }
}

fn read_pin_voltage<S: SampleSource>(source: &mut S) -> Result<f32, S::Error> {
    let raw = nb::block!(source.read())?;
    Ok(raw_to_pin_voltage_with(raw, source.resolution_bits()))
}

/// RMS of one quantity on `channel`
///
/// `convert` maps a pin voltage to the physical quantity (see [`crate::convert`]).
pub fn sample_rms<S, D, F>(
    source: &mut S,
    delay: &mut D,
    channel: Channel,
    window: RmsWindow,
    convert: F,
) -> Result<f32, S::Error>
where
    S: SampleSource,
    D: Delay,
    F: Fn(f32) -> f32,
{
    source.select(channel);

    let mut sum_sq = 0.0f64;
    for _ in 0..window.samples.get() {
        let value = f64::from(convert(read_pin_voltage(source)?));
        sum_sq += value * value;
        delay.delay(window.spacing);
    }

    Ok(libm::sqrt(sum_sq / f64::from(window.samples.get())) as f32)
}

/// RMS of instantaneous pack power, pairing V and I per iteration
pub fn sample_power_rms<S, D>(
    source: &mut S,
    delay: &mut D,
    window: RmsWindow,
) -> Result<f32, S::Error>
where
    S: SampleSource,
    D: Delay,
{
    let mut sum_sq = 0.0f64;
    for _ in 0..window.samples.get() {
        source.select(Channel::PackVoltage);
        let voltage = to_pack_voltage(read_pin_voltage(source)?);

        source.select(Channel::PackCurrent);
        let current = to_current(read_pin_voltage(source)?);

        let power = f64::from(voltage * current);
        sum_sq += power * power;
        delay.delay(window.spacing);
    }

    Ok(libm::sqrt(sum_sq / f64::from(window.samples.get())) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Replays a fixed sequence of codes per channel
    struct Scripted {
        selected: Channel,
        voltage: &'static [u16],
        current: &'static [u16],
        cell: &'static [u16],
        cursor: [usize; 3],
        selects: usize,
    }

    impl Scripted {
        fn new(cell: &'static [u16], voltage: &'static [u16], current: &'static [u16]) -> Self {
            Self {
                selected: Channel::CellVoltage,
                voltage,
                current,
                cell,
                cursor: [0; 3],
                selects: 0,
            }
        }
    }

    impl SampleSource for Scripted {
        type Error = Infallible;

        fn select(&mut self, channel: Channel) {
            self.selected = channel;
            self.selects += 1;
        }

        fn read(&mut self) -> nb::Result<u16, Infallible> {
            let series = match self.selected {
                Channel::CellVoltage => self.cell,
                Channel::PackVoltage => self.voltage,
                Channel::PackCurrent => self.current,
            };
            let idx = self.selected.input() as usize;
            let code = series[self.cursor[idx] % series.len()];
            self.cursor[idx] += 1;
            Ok(code)
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
        total_us: u32,
    }

    impl Delay for CountingDelay {
        fn delay(&mut self, duration: MicrosDurationU32) {
            self.calls += 1;
            self.total_us += duration.to_micros();
        }
    }

    fn window(samples: u16) -> RmsWindow {
        RmsWindow::new(NonZeroU16::new(samples).unwrap(), MicrosDurationU32::micros(50))
    }

    #[test]
    fn constant_signal_rms_is_the_constant() {
        for samples in [1u16, 2, 7, 100, 1000] {
            let mut source = Scripted::new(&[3000], &[0], &[0]);
            let mut delay = CountingDelay::default();
            let expected = to_pack_voltage(raw_to_pin_voltage_with(3000, 12));

            let rms = sample_rms(&mut source, &mut delay, Channel::CellVoltage, window(samples), to_pack_voltage)
                .unwrap();

            assert_eq!(rms, expected, "samples = {}", samples);
            assert_eq!(delay.calls, u32::from(samples));
        }
    }

    #[test]
    fn rms_of_symmetric_square_wave() {
        // Pin voltage alternates around the current sensor bias by ±1 V-ish;
        // RMS of ±a is a
        let mut source = Scripted::new(&[], &[], &[3289, 806]);
        let mut delay = CountingDelay::default();
        let rms = sample_rms(&mut source, &mut delay, Channel::PackCurrent, window(100), to_current).unwrap();

        let hi = to_current(raw_to_pin_voltage_with(3289, 12));
        let lo = to_current(raw_to_pin_voltage_with(806, 12));
        let expected = libm::sqrtf((hi * hi + lo * lo) / 2.0);
        assert!((rms - expected).abs() < 1e-3);
    }

    #[test]
    fn window_waits_for_every_sample() {
        let mut source = Scripted::new(&[100], &[0], &[0]);
        let mut delay = CountingDelay::default();
        sample_rms(&mut source, &mut delay, Channel::CellVoltage, RmsWindow::default(), |v| v).unwrap();
        assert_eq!(delay.total_us, 5000);
        assert_eq!(RmsWindow::default().duration().to_micros(), 5000);
    }

    #[test]
    fn power_rms_pairs_samples_before_squaring() {
        // V and I in phase: high V with high I, low V with low I.
        let mut source = Scripted::new(&[], &[2000, 1000], &[3000, 2048]);
        let mut delay = CountingDelay::default();
        let rms = sample_power_rms(&mut source, &mut delay, window(2)).unwrap();

        let p = |v_code: u16, i_code: u16| {
            to_pack_voltage(raw_to_pin_voltage_with(v_code, 12))
                * to_current(raw_to_pin_voltage_with(i_code, 12))
        };
        let (p1, p2) = (p(2000, 3000), p(1000, 2048));
        let paired = libm::sqrtf((p1 * p1 + p2 * p2) / 2.0);
        assert!((rms - paired).abs() < 1e-3);

        // Two channel switches per iteration
        assert_eq!(source.selects, 4);
    }
}
