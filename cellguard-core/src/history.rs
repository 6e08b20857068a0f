//! Fixed-Capacity Circular Log of Measurement Snapshots
//!
//! ## Overview
//!
//! Keeps the most recent `N` valid snapshots, each stamped with the monotonic
//! time it was appended. Capacity is a const generic so the whole log lives in
//! a fixed array: no allocation, O(1) append, and the oldest entry is evicted
//! automatically once the log is full.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularLog<5> after 7 appends (A..G):
//! ┌───┬───┬───┬───┬───┐
//! │ F │ G │ C │ D │ E │   ← physical slots
//! └───┴───┴───┴───┴───┘
//!           ↑
//!           write_pos = 2 (also the oldest entry while full)
//!
//! Logical view, oldest first: C D E F G
//! ```
//!
//! While the log is not yet full, slot 0 holds the oldest entry. Once full,
//! the oldest entry is the one `len` slots behind the write cursor, which is
//! the write cursor itself.
//!
//! ## Statistics
//!
//! [`CircularLog::statistics`] makes one linear pass. Energy is estimated as
//! `Σ power_i · interval / 3_600_000` Wh: every entry is assumed to stand for
//! exactly one logging interval. That is an approximation; skipped (invalid)
//! cycles and jitter in the real interval are not accounted for, so it is
//! not a true integral over the recorded timestamps.

use crate::constants::sampling::{LOG_INTERVAL_MS, MS_PER_HOUR};
use crate::snapshot::Snapshot;
use crate::time::Timestamp;

/// A snapshot paired with the time it was logged
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogEntry {
    /// Milliseconds since monitor start
    pub timestamp_ms: Timestamp,
    pub snapshot: Snapshot,
}

/// Minimum, maximum and mean of one logged quantity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Summary {
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

/// Aggregates over every stored entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LogStatistics {
    /// Entries the statistics cover
    pub entries: usize,
    /// Instantaneous cell voltage (V)
    pub cell_voltage: Summary,
    /// Cell temperature (°C)
    pub temperature: Summary,
    /// Fixed-slice energy estimate (Wh)
    pub energy_wh: f32,
    /// Entries with any fault flag set
    pub fault_events: usize,
    /// `fault_events / entries`, 0.0..=1.0
    pub fault_fraction: f32,
}

/// Fixed-size ring buffer of [`LogEntry`] values
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - iteration yields entries in append order
#[derive(Clone)]
pub struct CircularLog<const N: usize> {
    /// `None` marks slots never written since creation
    data: [Option<LogEntry>; N],

    /// Slot the next append writes
    write_pos: usize,

    /// Stored entries, saturates at N
    len: usize,

    /// Time slice each entry represents in energy estimates
    interval_ms: u32,
}

impl<const N: usize> CircularLog<N> {
    /// Empty log assuming the reference logging interval
    pub const fn new() -> Self {
        Self::with_interval(LOG_INTERVAL_MS)
    }

    /// Empty log whose energy estimate uses `interval_ms` per entry
    pub const fn with_interval(interval_ms: u32) -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
            interval_ms,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Store `snapshot` stamped with `timestamp_ms`, evicting the oldest entry when full
    pub fn append(&mut self, snapshot: Snapshot, timestamp_ms: Timestamp) {
        if N == 0 {
            return;
        }

        self.data[self.write_pos] = Some(LogEntry { timestamp_ms, snapshot });
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
        log_debug!("logged entry at {} ms ({}/{})", timestamp_ms, self.len, N);
    }

    /// Forget every entry; O(1), slots are reused by later appends
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
        log_info!("log cleared");
    }

    /// Most recent entry
    pub fn newest(&self) -> Option<&LogEntry> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Every entry, oldest first
    ///
    /// The iterator borrows the log, so it can be created again at any time
    /// (or cloned) to restart from the oldest entry.
    pub fn iter_ordered(&self) -> LogIter<'_, N> {
        LogIter { log: self, index: 0, end: self.len }
    }

    /// The `min(n, len)` most recent entries, oldest first
    pub fn last(&self, n: usize) -> LogIter<'_, N> {
        let take = n.min(self.len);
        LogIter { log: self, index: self.len - take, end: self.len }
    }

    /// Entry by logical index (0 = oldest)
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2, full)
    /// Logical:   [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % N]
    /// ```
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }

    /// Aggregate statistics in a single pass; `None` when empty
    pub fn statistics(&self) -> Option<LogStatistics> {
        if self.is_empty() {
            return None;
        }

        let slice_hours = self.interval_ms as f32 / MS_PER_HOUR;

        let mut volts = Accumulator::new();
        let mut temps = Accumulator::new();
        let mut energy_wh = 0.0f32;
        let mut fault_events = 0usize;

        for entry in self.iter_ordered() {
            let s = &entry.snapshot;
            volts.add(s.cell_v);
            temps.add(s.cell_temp_c);
            energy_wh += s.pack_power * slice_hours;
            if s.flags().any() {
                fault_events += 1;
            }
        }

        Some(LogStatistics {
            entries: self.len,
            cell_voltage: volts.summary(self.len),
            temperature: temps.summary(self.len),
            energy_wh,
            fault_events,
            fault_fraction: fault_events as f32 / self.len as f32,
        })
    }
}

impl<const N: usize> Default for CircularLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

struct Accumulator {
    min: f32,
    max: f32,
    sum: f32,
}

impl Accumulator {
    fn new() -> Self {
        Self { min: f32::INFINITY, max: f32::NEG_INFINITY, sum: 0.0 }
    }

    fn add(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    fn summary(&self, count: usize) -> Summary {
        Summary { min: self.min, max: self.max, avg: self.sum / count as f32 }
    }
}

/// Ordered view over a [`CircularLog`]
#[derive(Clone)]
pub struct LogIter<'a, const N: usize> {
    log: &'a CircularLog<N>,
    index: usize,
    end: usize,
}

impl<'a, const N: usize> Iterator for LogIter<'a, N> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }

        let item = self.log.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, const N: usize> ExactSizeIterator for LogIter<'a, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(cell_v: f32) -> Snapshot {
        Snapshot { cell_v, data_valid: true, ..Snapshot::default() }
    }

    fn cell_voltages<'a, const N: usize>(iter: LogIter<'a, N>) -> std::vec::Vec<f32> {
        iter.map(|e| e.snapshot.cell_v).collect()
    }

    #[test]
    fn empty_log() {
        let log: CircularLog<5> = CircularLog::new();
        assert!(log.is_empty());
        assert_eq!(log.iter_ordered().count(), 0);
        assert_eq!(log.last(3).count(), 0);
        assert!(log.newest().is_none());
        assert!(log.statistics().is_none());
    }

    #[test]
    fn partial_fill_starts_at_slot_zero() {
        let mut log = CircularLog::<4>::new();
        for i in 0..3 {
            log.append(snap(i as f32), i * 1000);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(cell_voltages(log.iter_ordered()), [0.0, 1.0, 2.0]);
        assert_eq!(log.newest().unwrap().timestamp_ms, 2000);
    }

    #[test]
    fn overflow_keeps_most_recent_in_order() {
        const N: usize = 10;
        let mut log = CircularLog::<N>::new();
        for i in 0..(N + 5) {
            log.append(snap(i as f32), i as u64);
        }

        assert_eq!(log.len(), N);
        assert!(log.is_full());
        let expected: std::vec::Vec<f32> = (5..N + 5).map(|i| i as f32).collect();
        assert_eq!(cell_voltages(log.iter_ordered()), expected);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut log = CircularLog::<3>::new();
        for i in 0..4 {
            log.append(snap(i as f32), i);
        }
        let iter = log.iter_ordered();
        let first = cell_voltages(iter.clone());
        let second = cell_voltages(iter);
        assert_eq!(first, second);
        assert_eq!(log.iter_ordered().len(), 3);
    }

    #[test]
    fn last_n_is_clamped_to_count() {
        let mut log = CircularLog::<5>::new();
        for i in 0..7 {
            log.append(snap(i as f32), i);
        }
        assert_eq!(cell_voltages(log.last(2)), [5.0, 6.0]);
        assert_eq!(cell_voltages(log.last(50)), [2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(log.last(0).count(), 0);
    }

    #[test]
    fn clear_resets_cursor_and_count() {
        let mut log = CircularLog::<3>::new();
        for i in 0..5 {
            log.append(snap(i as f32), i);
        }
        log.clear();
        assert!(log.is_empty());

        log.append(snap(9.0), 99);
        assert_eq!(cell_voltages(log.iter_ordered()), [9.0]);
    }

    #[test]
    fn statistics_over_three_entries() {
        let mut log = CircularLog::<100>::new();
        for (i, v) in [3.0, 4.0, 3.5].into_iter().enumerate() {
            log.append(snap(v), i as u64 * 1000);
        }

        let stats = log.statistics().unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.cell_voltage.min, 3.0);
        assert_eq!(stats.cell_voltage.max, 4.0);
        assert_eq!(stats.cell_voltage.avg, 3.5);
    }

    #[test]
    fn energy_uses_fixed_interval_slices() {
        let mut log = CircularLog::<10>::with_interval(1000);
        for i in 0..4 {
            let s = Snapshot { pack_power: 36.0, data_valid: true, ..Snapshot::default() };
            // Timestamps deliberately irregular: they do not affect the estimate
            log.append(s, i * 7919);
        }
        let stats = log.statistics().unwrap();
        // 4 × 36 W × 1 s = 144 J = 0.04 Wh
        assert!((stats.energy_wh - 0.04).abs() < 1e-6);
    }

    #[test]
    fn fault_events_count_any_flag() {
        let mut log = CircularLog::<10>::new();
        log.append(Snapshot { ov_flag: true, ..snap(4.3) }, 0);
        log.append(snap(3.7), 1);
        log.append(Snapshot { t_warn: true, ..snap(3.7) }, 2);
        log.append(snap(3.7), 3);

        let stats = log.statistics().unwrap();
        assert_eq!(stats.fault_events, 2);
        assert_eq!(stats.fault_fraction, 0.5);
    }
}
