//! CellGuard host monitor
//!
//! Runs the measurement core against simulated hardware and exposes the
//! command console on stdin/stdout.
//!
//! ```text
//! ┌────────────┐  bytes   ┌───────────────┐  lines  ┌──────────────┐
//! │ stdin      │ ───────▶ │ LineAssembler │ ──────▶ │ Monitor      │
//! │ (thread)   │  mpsc    └───────────────┘         │ handle_line  │
//! └────────────┘                                    │ run_cycle    │
//!                                                   └──────┬───────┘
//!                                               reports    ▼
//!                                                       stdout
//! ```
//!
//! Usage: `cellguard-monitor [config.json]` (or set `CELLGUARD_CONFIG`).
//! Diagnostics are controlled with `RUST_LOG`.

mod config;
mod report;
mod sim;

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cellguard_core::constants::LOG_CAPACITY;
use cellguard_core::traits::StatusIndicator;
use cellguard_core::{CommandLine, CycleOutcome, LineAssembler, MonotonicTime, Monitor, SnapshotBuilder};
use log::{debug, info, warn};

use sim::{ConsoleIndicator, SimulatedAdc, SimulatedThermometer, SimulatedValidity, SpinDelay};

const ADC_SEED: u32 = 0x5EED_0001;
const VALIDITY_SEED: u32 = 0x5EED_0002;

/// Forward raw stdin bytes to the main loop without ever blocking it
fn spawn_stdin_reader() -> Result<Receiver<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 256];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => {
                        debug!("stdin closed");
                        break;
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        warn!("stdin read failed: {err}");
                        break;
                    }
                }
            }
        })
        .context("spawning stdin reader")?;
    Ok(rx)
}

/// Collect every complete line currently buffered; never waits
fn drain_lines(rx: &Receiver<Vec<u8>>, assembler: &mut LineAssembler) -> Vec<CommandLine> {
    let mut lines = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(chunk) => lines.extend(chunk.into_iter().filter_map(|b| assembler.push(b))),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    lines
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::load(std::env::args().nth(1))?;
    let interval = Duration::from_millis(u64::from(config.log_interval().to_millis()));

    let builder = SnapshotBuilder::new(
        SimulatedAdc::new(ADC_SEED),
        SimulatedValidity::new(VALIDITY_SEED),
        SimulatedThermometer::new(interval.as_secs_f32()),
        SpinDelay,
    );
    let mut monitor: Monitor<_, _, _, _, _, LOG_CAPACITY> =
        Monitor::from_config(builder, MonotonicTime::new(), &config)?;
    let mut led = ConsoleIndicator::default();

    info!(
        "monitoring every {} ms, RMS window {} samples",
        config.log_interval_ms, config.rms_samples
    );

    let input = spawn_stdin_reader()?;
    let mut assembler = LineAssembler::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_banner(&mut out)?;

    loop {
        let started = Instant::now();

        match monitor.run_cycle() {
            Ok(CycleOutcome::Logged { snapshot, indicator, .. }) => {
                led.set_level(indicator);
                report::write_status_line(&mut out, &snapshot, monitor.log().len(), LOG_CAPACITY)?;
            }
            Ok(CycleOutcome::Skipped) => {
                writeln!(out, "WARNING: Wrong digital value given - data not valid!")?;
            }
            Err(never) => match never {},
        }

        for line in drain_lines(&input, &mut assembler) {
            report::write_echo(&mut out, &line)?;
            match monitor.handle_line(&line) {
                Ok(response) => report::write_response(&mut out, response)?,
                Err(err) => report::write_error(&mut out, &err)?,
            }
        }
        out.flush()?;

        monitor.builder_mut().source_mut().advance(interval.as_secs_f32());
        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
}
