//! Integration tests for the command interface
//!
//! Bytes go through the line assembler into a live monitor, the way a serial
//! console drives it.

mod common;

use core::cell::Cell;

use cellguard_core::{
    CalibrationField, CellGuardError, FixedTime, LineAssembler, LogQuery, Monitor, Response,
};

use common::{builder, ChannelAdc};

fn lines(input: &str) -> Vec<String> {
    let mut assembler = LineAssembler::new();
    input
        .bytes()
        .filter_map(|b| assembler.push(b))
        .map(|line| line.as_str().to_owned())
        .collect()
}

#[test]
fn setcal_then_read_reports_new_factor() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);
    monitor.run_cycle().unwrap();

    let commands = lines("SETCAL 1.5\r\n\r\nREAD\n");
    assert_eq!(commands, vec!["SETCAL 1.5", "READ"]);

    match monitor.handle_line(&commands[0]) {
        Ok(Response::Updated { field: CalibrationField::CalFactor, value }) => {
            assert_eq!(value, 1.5)
        }
        _ => panic!("expected calibration update"),
    }
    match monitor.handle_line(&commands[1]) {
        Ok(Response::Status { calibration, .. }) => assert_eq!(calibration.cal_factor(), 1.5),
        _ => panic!("expected status"),
    }
}

#[test]
fn rejected_commands_leave_state_unchanged() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);
    monitor.run_cycle().unwrap();
    let before = *monitor.calibration();

    assert!(matches!(
        monitor.handle_line("SETCAL 2.5"),
        Err(CellGuardError::OutOfRange { field: CalibrationField::CalFactor, .. })
    ));
    assert!(matches!(
        monitor.handle_line("SETOV abc"),
        Err(CellGuardError::OutOfRange { field: CalibrationField::OvLimit, .. })
    ));
    assert!(matches!(
        monitor.handle_line("read"),
        Err(CellGuardError::UnrecognizedCommand { .. })
    ));
    assert!(matches!(monitor.handle_line("LOGLAST 0"), Err(CellGuardError::InvalidNumber)));

    assert_eq!(*monitor.calibration(), before);
    assert_eq!(monitor.log().len(), 1);
}

#[test]
fn absolute_set_without_number_stores_zero_when_in_range() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);

    assert!(monitor.handle_line("SETOFFSET 0.5").is_ok());
    match monitor.handle_line("SETOFFSET abc") {
        Ok(Response::Updated { field: CalibrationField::VoltageOffset, value }) => {
            assert_eq!(value, 0.0)
        }
        _ => panic!("expected offset update"),
    }
    assert_eq!(monitor.calibration().voltage_offset(), 0.0);
}

#[test]
fn relative_adjustments_clamp_to_range() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);

    assert!(monitor.handle_line("CAL +10").is_ok());
    assert_eq!(monitor.calibration().cal_factor(), 2.0);

    assert!(monitor.handle_line("OFFSET -0.25").is_ok());
    assert_eq!(monitor.calibration().voltage_offset(), -0.25);

    // Missing number is a zero delta
    assert!(monitor.handle_line("OFFSET x").is_ok());
    assert_eq!(monitor.calibration().voltage_offset(), -0.25);
}

#[test]
fn loglast_returns_newest_entries_oldest_first() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);

    for _ in 0..5 {
        clock.advance(1000);
        monitor.run_cycle().unwrap();
    }

    match monitor.handle_line("LOGLAST 2") {
        Ok(Response::Entries { query: LogQuery::Last(2), entries }) => {
            let stamps: Vec<u64> = entries.map(|e| e.timestamp_ms).collect();
            assert_eq!(stamps, vec![4000, 5000]);
        }
        _ => panic!("expected entries"),
    }

    match monitor.handle_line("LOGLAST 50") {
        Ok(Response::Entries { entries, .. }) => assert_eq!(entries.len(), 5),
        _ => panic!("expected entries"),
    }
}

#[test]
fn clear_empties_every_log_view() {
    let valid = Cell::new(true);
    let temperature = Cell::new(25.0);
    let clock = FixedTime::new(0);
    let mut monitor: Monitor<_, _, _, _, _, 100> =
        Monitor::new(builder(ChannelAdc::healthy(), &valid, &temperature), &clock);
    monitor.run_cycle().unwrap();

    assert!(matches!(monitor.handle_line("LOGCLEAR"), Ok(Response::Cleared)));
    assert!(matches!(monitor.handle_line("LOG"), Ok(Response::Empty(LogQuery::All))));
    assert!(matches!(monitor.handle_line("CSV"), Ok(Response::Empty(LogQuery::Csv))));
    assert!(matches!(monitor.handle_line("LOGSTATS"), Ok(Response::Empty(LogQuery::Stats))));
    assert!(monitor.log().is_empty());
}

#[test]
fn overlong_lines_are_truncated_not_split() {
    let long = format!("SETCAL 1.2{}\n", "0".repeat(100));
    let commands = lines(&long);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].len(), 63);
    assert!(commands[0].starts_with("SETCAL 1.2"));
}
