//! Console reports
//!
//! Renders command responses, errors and the per-cycle status line as plain
//! text. Number formats are fixed so CSV exports stay comparable across runs:
//! 3 decimals for voltages, currents and seconds, 1 for temperature and
//! throttle percent, 2 for power.

use std::io::{self, Write};

use cellguard_core::{
    CalibrationField, CalibrationState, CellGuardError, LogEntry, LogQuery, LogStatistics,
    Response, Snapshot,
};

/// CSV header, one column per exported field
pub const CSV_HEADER: &str = "timestamp_ms,timestamp_sec,cell_v,cell_v_rms,cell_temp_c,\
pack_v,pack_v_rms,pack_i,pack_i_rms,power_w,power_w_rms,throttle_percent,\
ov_flag,uv_flag,t_warn,t_fault,data_valid";

pub const CSV_START: &str = "========== CSV EXPORT START ==========";
pub const CSV_END: &str = "========== CSV EXPORT END ==========";

fn bit(flag: bool) -> u8 {
    u8::from(flag)
}

fn seconds(timestamp_ms: u64) -> f64 {
    timestamp_ms as f64 / 1000.0
}

pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n================================")?;
    writeln!(out, "  CellGuard battery monitor")?;
    writeln!(out, "================================")?;
    writeln!(out, "Type HELP for commands")?;
    writeln!(out, "Type LOGCSV to export data\n")
}

/// One line per logged cycle
pub fn write_status_line<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    log_len: usize,
    log_capacity: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "CellV:{:.2} | PackV:{:.2} | I:{:.2} | P:{:.1}W | T:{:.1}C | Thr:{:.0}% | OV={} UV={} | Log:{}/{}",
        snapshot.cell_v,
        snapshot.pack_v,
        snapshot.pack_i,
        snapshot.pack_power,
        snapshot.cell_temp_c,
        snapshot.throttle_factor * 100.0,
        bit(snapshot.ov_flag),
        bit(snapshot.uv_flag),
        log_len,
        log_capacity,
    )
}

/// Echo of an accepted command line
pub fn write_echo<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    writeln!(out, "\n>>> {line}")
}

pub fn write_response<'a, W, const N: usize>(out: &mut W, response: Response<'a, N>) -> io::Result<()>
where
    W: Write,
{
    match response {
        Response::Status { snapshot, calibration } => write_status(out, &snapshot, &calibration),
        Response::Entries { query: LogQuery::Csv, entries } => write_csv(out, entries),
        Response::Entries { query: LogQuery::Last(n), entries } => write_last(out, n, entries),
        Response::Entries { entries, .. } => write_table(out, entries),
        Response::Statistics(stats) => write_statistics(out, &stats),
        Response::Empty(query) => write_empty(out, query),
        Response::Cleared => writeln!(out, "LOG: Cleared"),
        Response::Updated { field, value } => write_updated(out, field, value),
        Response::Help(lines) => write_help(out, lines),
    }
}

pub fn write_error<W: Write>(out: &mut W, err: &CellGuardError) -> io::Result<()> {
    match err {
        CellGuardError::OutOfRange { field, .. } => {
            let label = match field {
                CalibrationField::CalFactor => "cal",
                CalibrationField::VoltageOffset => "offset",
                CalibrationField::OvLimit => "OV",
                CalibrationField::UvLimit => "UV",
            };
            writeln!(out, "ERR: {label} value out of range")
        }
        CellGuardError::InvalidNumber => writeln!(out, "ERR: invalid number"),
        CellGuardError::UnrecognizedCommand { input } => {
            writeln!(out, "ERR: unknown command '{input}' (type HELP)")
        }
    }
}

fn write_status<W: Write>(
    out: &mut W,
    s: &Snapshot,
    calibration: &CalibrationState,
) -> io::Result<()> {
    writeln!(out, "\n=== BMS STATUS ===")?;
    writeln!(out, "Cell V: {:.3} V (RMS: {:.3} V)", s.cell_v, s.cell_v_rms)?;
    writeln!(out, "Cell T: {:.1} C", s.cell_temp_c)?;
    writeln!(out, "Pack V: {:.3} V (RMS: {:.3} V)", s.pack_v, s.pack_v_rms)?;
    writeln!(out, "Pack I: {:.3} A (RMS: {:.3} A)", s.pack_i, s.pack_i_rms)?;
    writeln!(out, "Power:  {:.2} W (RMS: {:.2} W)", s.pack_power, s.pack_power_rms)?;
    writeln!(out, "Throttle: {:.1}%", s.throttle_factor * 100.0)?;
    writeln!(
        out,
        "Flags: OV={} UV={} TW={} TF={} VALID={}",
        bit(s.ov_flag),
        bit(s.uv_flag),
        bit(s.t_warn),
        bit(s.t_fault),
        bit(s.data_valid),
    )?;
    writeln!(
        out,
        "Calibration: cal_factor={:.4} offset={:.3} V OV={:.2} V UV={:.2} V",
        calibration.cal_factor(),
        calibration.voltage_offset(),
        calibration.ov_limit(),
        calibration.uv_limit(),
    )?;
    writeln!(out, "==================")
}

fn write_table<'a, W, I>(out: &mut W, entries: I) -> io::Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = &'a LogEntry>,
{
    writeln!(out, "\n=== LOG DUMP ({} entries) ===", entries.len())?;
    writeln!(out, "Time(s) | CellV | CellVrms | PackV | PackI | Power | Temp | Thr% | OV|UV|TW|TF|VAL")?;
    writeln!(out, "--------|-------|----------|-------|-------|-------|------|------|---------------")?;
    for entry in entries {
        let s = &entry.snapshot;
        writeln!(
            out,
            "{:7.1} | {:5.2} | {:8.2} | {:5.2} | {:5.2} | {:5.1} | {:4.1} | {:4.0} | {} | {} | {} | {} | {}",
            seconds(entry.timestamp_ms),
            s.cell_v,
            s.cell_v_rms,
            s.pack_v,
            s.pack_i,
            s.pack_power,
            s.cell_temp_c,
            s.throttle_factor * 100.0,
            bit(s.ov_flag),
            bit(s.uv_flag),
            bit(s.t_warn),
            bit(s.t_fault),
            bit(s.data_valid),
        )?;
    }
    writeln!(out, "======================\n")
}

fn write_last<'a, W, I>(out: &mut W, requested: usize, entries: I) -> io::Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = &'a LogEntry>,
{
    writeln!(out, "\n=== LAST {} ENTRIES ===", requested.min(entries.len()))?;
    writeln!(out, "Time(s) | CellV | PackV | PackI | Power | Temp | Flags")?;
    writeln!(out, "--------|-------|-------|-------|-------|------|-------")?;
    for entry in entries {
        let s = &entry.snapshot;
        writeln!(
            out,
            "{:7.1} | {:5.2} | {:5.2} | {:5.2} | {:5.1} | {:4.1} | OV={} UV={} TW={} TF={}",
            seconds(entry.timestamp_ms),
            s.cell_v,
            s.pack_v,
            s.pack_i,
            s.pack_power,
            s.cell_temp_c,
            bit(s.ov_flag),
            bit(s.uv_flag),
            bit(s.t_warn),
            bit(s.t_fault),
        )?;
    }
    writeln!(out, "====================\n")
}

/// CSV block between START/END markers, oldest entry first, then copy instructions
pub fn write_csv<'a, W, I>(out: &mut W, entries: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a LogEntry>,
{
    writeln!(out, "\n{CSV_START}")?;
    writeln!(out, "{CSV_HEADER}")?;
    for entry in entries {
        let s = &entry.snapshot;
        writeln!(
            out,
            "{},{:.3},{:.3},{:.3},{:.1},{:.3},{:.3},{:.3},{:.3},{:.2},{:.2},{:.1},{},{},{},{},{}",
            entry.timestamp_ms,
            seconds(entry.timestamp_ms),
            s.cell_v,
            s.cell_v_rms,
            s.cell_temp_c,
            s.pack_v,
            s.pack_v_rms,
            s.pack_i,
            s.pack_i_rms,
            s.pack_power,
            s.pack_power_rms,
            s.throttle_factor * 100.0,
            bit(s.ov_flag),
            bit(s.uv_flag),
            bit(s.t_warn),
            bit(s.t_fault),
            bit(s.data_valid),
        )?;
    }
    writeln!(out, "{CSV_END}\n")?;
    writeln!(out, "INSTRUCTIONS:")?;
    writeln!(out, "1. Select all text between START and END lines")?;
    writeln!(out, "2. Copy to clipboard (Ctrl+C)")?;
    writeln!(out, "3. Paste into text editor and save as .csv")?;
    writeln!(out, "4. Open with Excel, Python pandas, etc.\n")
}

fn write_statistics<W: Write>(out: &mut W, stats: &LogStatistics) -> io::Result<()> {
    let v = &stats.cell_voltage;
    let t = &stats.temperature;
    writeln!(out, "\n=== LOG STATISTICS ===")?;
    writeln!(out, "Entries: {}", stats.entries)?;
    writeln!(out, "Cell Voltage: min={:.2} V, max={:.2} V, avg={:.2} V", v.min, v.max, v.avg)?;
    writeln!(out, "Temperature:  min={:.1} C, max={:.1} C, avg={:.1} C", t.min, t.max, t.avg)?;
    // Fixed-slice estimate: every entry counts as one full log interval
    writeln!(out, "Total Energy: {:.3} Wh", stats.energy_wh)?;
    writeln!(
        out,
        "Fault events: {} ({:.1}%)",
        stats.fault_events,
        stats.fault_fraction * 100.0
    )?;
    writeln!(out, "======================\n")
}

fn write_empty<W: Write>(out: &mut W, query: LogQuery) -> io::Result<()> {
    match query {
        LogQuery::All | LogQuery::Last(_) => writeln!(out, "LOG: Empty"),
        LogQuery::Csv => writeln!(out, "ERROR: No data to export"),
        LogQuery::Stats => writeln!(out, "LOG: No data for statistics"),
    }
}

fn write_updated<W: Write>(out: &mut W, field: CalibrationField, value: f32) -> io::Result<()> {
    match field {
        CalibrationField::CalFactor => writeln!(out, "OK: cal_factor={value:.4}"),
        CalibrationField::VoltageOffset => writeln!(out, "OK: voltage_offset={value:.3} V"),
        CalibrationField::OvLimit => writeln!(out, "OK: OV_LIMIT={value:.2} V"),
        CalibrationField::UvLimit => writeln!(out, "OK: UV_LIMIT={value:.2} V"),
    }
}

fn write_help<W: Write>(out: &mut W, lines: &[(&str, &str)]) -> io::Result<()> {
    writeln!(out, "\n=== BMS COMMANDS ===")?;
    for (usage, description) in lines {
        writeln!(out, "  {usage:<17} - {description}")?;
    }
    writeln!(out, "====================\n")
}
