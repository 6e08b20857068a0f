//! Command Protocol Handler
//!
//! Parsing and execution are separate steps: [`Command::parse`] turns a line
//! into a tagged [`Command`], and [`execute`] applies it to the calibration
//! store and the circular log. Each command can be tested on its own.
//!
//! Keywords are case-sensitive. Verbs that take an argument require a single
//! space after the keyword (`LOGLAST 5`, `CAL -0.01`).
//!
//! ## Numeric Arguments
//!
//! Arguments are read like C `strtof`/`atoi`: leading whitespace is skipped
//! and the longest numeric prefix wins, so `SETOV 4.15V` sets 4.15.
//!
//! - delta commands (`CAL`, `OFFSET`) treat a missing number as 0
//! - absolute sets also read a missing number as 0, then range-check it
//!   (`SETOFFSET abc` stores 0.0, `SETCAL abc` is out of range)
//! - `LOGLAST` needs a positive integer

use crate::calibration::{CalibrationField, CalibrationState};
use crate::errors::{CellGuardError, CellGuardResult};
use crate::history::{CircularLog, LogIter, LogStatistics};
use crate::snapshot::Snapshot;

/// One parsed operator command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `READ`
    Read,
    /// `LOG` / `LOGALL`
    LogAll,
    /// `LOGCSV` / `CSV`
    LogCsv,
    /// `LOGLAST <n>`, n > 0
    LogLast(usize),
    /// `LOGSTATS`
    LogStats,
    /// `LOGCLEAR`
    LogClear,
    /// `SETCAL`, `SETOFFSET`, `SETOV`, `SETUV`
    Set(CalibrationField, f32),
    /// `CAL`, `OFFSET`
    Adjust(CalibrationField, f32),
    /// `HELP`
    Help,
}

/// Which log view a query asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogQuery {
    All,
    Csv,
    Last(usize),
    Stats,
}

/// Usage line and description for `HELP`
pub const HELP: &[(&str, &str)] = &[
    ("READ", "show current status"),
    ("LOG / LOGALL", "dump all log entries"),
    ("LOGCSV / CSV", "export log as CSV format"),
    ("LOGLAST <n>", "show last n entries"),
    ("LOGSTATS", "show statistics"),
    ("LOGCLEAR", "clear log"),
    ("SETCAL <val>", "set calibration factor"),
    ("CAL +/-<val>", "adjust calibration"),
    ("SETOFFSET <val>", "set voltage offset"),
    ("OFFSET +/-<val>", "adjust offset"),
    ("SETOV <voltage>", "set OV limit"),
    ("SETUV <voltage>", "set UV limit"),
    ("HELP", "show this help"),
];

impl Command {
    /// Parse one line (without its terminator)
    pub fn parse(line: &str) -> CellGuardResult<Self> {
        let command = match line {
            "READ" => Command::Read,
            "LOG" | "LOGALL" => Command::LogAll,
            "LOGCSV" | "CSV" => Command::LogCsv,
            "LOGSTATS" => Command::LogStats,
            "LOGCLEAR" => Command::LogClear,
            "HELP" => Command::Help,
            _ => return Self::parse_with_argument(line),
        };
        Ok(command)
    }

    fn parse_with_argument(line: &str) -> CellGuardResult<Self> {
        let Some((verb, arg)) = line.split_once(' ') else {
            return Err(CellGuardError::unrecognized(line));
        };

        let command = match verb {
            "LOGLAST" => Command::LogLast(parse_count(arg)?),
            "SETCAL" => Command::Set(CalibrationField::CalFactor, parse_value(arg)),
            "SETOFFSET" => Command::Set(CalibrationField::VoltageOffset, parse_value(arg)),
            "SETOV" => Command::Set(CalibrationField::OvLimit, parse_value(arg)),
            "SETUV" => Command::Set(CalibrationField::UvLimit, parse_value(arg)),
            "CAL" => Command::Adjust(CalibrationField::CalFactor, parse_delta(arg)),
            "OFFSET" => Command::Adjust(CalibrationField::VoltageOffset, parse_delta(arg)),
            _ => return Err(CellGuardError::unrecognized(line)),
        };
        Ok(command)
    }

    /// `true` for commands that only read state
    pub fn is_query(&self) -> bool {
        !matches!(self, Command::LogClear | Command::Set(..) | Command::Adjust(..))
    }
}

/// Longest prefix of `s` that reads as a decimal float (sign, digits,
/// fraction, exponent)
fn float_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return "";
    }

    // Exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

fn parse_leading_f32(arg: &str) -> Option<f32> {
    let prefix = float_prefix(arg.trim_start());
    if prefix.is_empty() {
        return None;
    }
    prefix.parse().ok()
}

/// Absolute-set argument; no numeric prefix reads as 0 and the range check decides
fn parse_value(arg: &str) -> f32 {
    parse_leading_f32(arg).unwrap_or(0.0)
}

fn parse_delta(arg: &str) -> f32 {
    parse_leading_f32(arg).unwrap_or(0.0)
}

fn parse_count(arg: &str) -> CellGuardResult<usize> {
    let arg = arg.trim_start();
    let digits = arg.strip_prefix('+').unwrap_or(arg);
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return Err(CellGuardError::InvalidNumber);
    }

    // Saturate like a count that exceeds the log: LOGLAST 99999999999 shows everything
    let n = digits[..len].parse::<usize>().unwrap_or(usize::MAX);
    if n == 0 {
        return Err(CellGuardError::InvalidNumber);
    }
    Ok(n)
}

/// Structured outcome of an executed command
///
/// Formatting is left to the transport side.
#[derive(Clone)]
pub enum Response<'a, const N: usize> {
    /// Latest snapshot plus the live calibration
    Status {
        snapshot: Snapshot,
        calibration: CalibrationState,
    },
    /// Log entries for `LOG`, `LOGCSV` or `LOGLAST`, oldest first
    Entries {
        query: LogQuery,
        entries: LogIter<'a, N>,
    },
    /// Aggregates for `LOGSTATS`
    Statistics(LogStatistics),
    /// A log query found no entries
    Empty(LogQuery),
    /// `LOGCLEAR` done
    Cleared,
    /// A calibration field now holds `value`
    Updated {
        field: CalibrationField,
        value: f32,
    },
    /// Command reference
    Help(&'static [(&'static str, &'static str)]),
}

/// Apply `command` to the calibration store and the log
///
/// `latest` is the snapshot reported by `READ`.
pub fn execute<'a, const N: usize>(
    command: Command,
    calibration: &mut CalibrationState,
    log: &'a mut CircularLog<N>,
    latest: &Snapshot,
) -> CellGuardResult<Response<'a, N>> {
    if command == Command::LogClear {
        log.clear();
        return Ok(Response::Cleared);
    }
    let log: &'a CircularLog<N> = log;

    let response = match command {
        Command::Read => Response::Status {
            snapshot: *latest,
            calibration: *calibration,
        },
        Command::LogAll => entries(log, LogQuery::All, log.iter_ordered()),
        Command::LogCsv => entries(log, LogQuery::Csv, log.iter_ordered()),
        Command::LogLast(n) => entries(log, LogQuery::Last(n), log.last(n)),
        Command::LogStats => match log.statistics() {
            Some(stats) => Response::Statistics(stats),
            None => Response::Empty(LogQuery::Stats),
        },
        Command::Set(field, value) => Response::Updated {
            field,
            value: calibration.set_absolute(field, value)?,
        },
        Command::Adjust(field, delta) => Response::Updated {
            field,
            value: calibration.apply_delta(field, delta),
        },
        Command::Help => Response::Help(HELP),
        Command::LogClear => Response::Cleared,
    };
    Ok(response)
}

fn entries<'a, const N: usize>(
    log: &CircularLog<N>,
    query: LogQuery,
    entries: LogIter<'a, N>,
) -> Response<'a, N> {
    if log.is_empty() {
        Response::Empty(query)
    } else {
        Response::Entries { query, entries }
    }
}

/// Parse and execute one line
///
/// Errors are logged and returned; none of them changes any state.
pub fn dispatch<'a, const N: usize>(
    line: &str,
    calibration: &mut CalibrationState,
    log: &'a mut CircularLog<N>,
    latest: &Snapshot,
) -> CellGuardResult<Response<'a, N>> {
    let result = match Command::parse(line) {
        Ok(command) => {
            if !command.is_query() {
                log_debug!("applying '{}'", line);
            }
            execute(command, calibration, log, latest)
        }
        Err(err) => Err(err),
    };
    if let Err(_err) = &result {
        log_warn!("command '{}' failed: {}", line, _err);
    }
    result
}
