//! Replay scripted switch activity through the real scan loop and print the
//! HID reports the keyboard would send.
//!
//! Script format, one command per line:
//! ```text
//! # comment
//! press 2 1      # close the switch at row 2, column 1
//! release 2 1
//! scan 3         # run three scan cycles (default 1)
//! ```

use std::io::Write;

use anyhow::{bail, Context, Result};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use phantom_core::{
    Col, Debounce, HidTransport, KeyPosition, KeyboardReport, MatrixLines, Modifiers, Row,
    ScanConfig, Scheduler, LAYOUT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(KeyPosition),
    Release(KeyPosition),
    Scan(u32),
}

/// Parse a replay script. Errors name the offending line.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    for (number, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let command =
            parse_line(line).with_context(|| format!("line {}: {:?}", number + 1, line))?;
        commands.push(command);
    }

    Ok(commands)
}

fn parse_line(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["press", row, col] => Ok(Command::Press(parse_position(row, col)?)),
        ["release", row, col] => Ok(Command::Release(parse_position(row, col)?)),
        ["scan"] => Ok(Command::Scan(1)),
        ["scan", count] => {
            let count = count.parse().context("scan count is not a number")?;
            Ok(Command::Scan(count))
        }
        [word, ..] => bail!("unknown command `{}`", word),
        [] => bail!("empty command"),
    }
}

fn parse_position(row: &str, col: &str) -> Result<KeyPosition> {
    let row: u8 = row.parse().context("row is not a number")?;
    let col: u8 = col.parse().context("column is not a number")?;
    let row = Row::new(row).with_context(|| format!("row {} out of range", row))?;
    let col = Col::new(col).with_context(|| format!("column {} out of range", col))?;
    Ok(KeyPosition::new(row, col))
}

/// Switch matrix driven by the script instead of copper.
#[derive(Default)]
struct SimulatedMatrix {
    closed: Vec<KeyPosition>,
    driven: Option<Col>,
}

impl MatrixLines for SimulatedMatrix {
    fn set_column(&mut self, col: Col, active: bool) {
        self.driven = if active { Some(col) } else { None };
    }

    fn row_asserted(&mut self, row: Row) -> bool {
        self.driven
            .map(|col| self.closed.contains(&KeyPosition::new(row, col)))
            .unwrap_or(false)
    }
}

/// Collects reports until the replay loop prints them.
#[derive(Default)]
struct CapturedReports {
    pending: Vec<KeyboardReport>,
}

impl HidTransport for CapturedReports {
    fn is_configured(&self) -> bool {
        true
    }

    fn send_report(&mut self, report: &KeyboardReport) {
        self.pending.push(*report);
    }
}

/// Simulated time only advances the counters; nothing sleeps.
#[derive(Default)]
struct SimulatedClock {
    elapsed_us: u64,
}

impl DelayUs<u16> for SimulatedClock {
    fn delay_us(&mut self, us: u16) {
        self.elapsed_us += u64::from(us);
    }
}

impl DelayMs<u16> for SimulatedClock {
    fn delay_ms(&mut self, ms: u16) {
        self.elapsed_us += u64::from(ms) * 1000;
    }
}

/// Run the commands and write one line per report sent.
pub fn run<D: Debounce, W: Write>(commands: &[Command], debounce: D, out: &mut W) -> Result<()> {
    let mut scheduler = Scheduler::new(
        SimulatedMatrix::default(),
        CapturedReports::default(),
        SimulatedClock::default(),
        debounce,
        ScanConfig::DEFAULT,
    );
    scheduler.init();

    let mut cycle = 0u32;
    let mut sent: Vec<KeyboardReport> = Vec::new();

    for command in commands {
        match *command {
            Command::Press(position) => {
                let closed = &mut scheduler.lines_mut().closed;
                if !closed.contains(&position) {
                    closed.push(position);
                }
            }
            Command::Release(position) => {
                scheduler.lines_mut().closed.retain(|&p| p != position);
            }
            Command::Scan(count) => {
                for _ in 0..count {
                    cycle += 1;
                    let events = scheduler.cycle();
                    log::debug!("cycle {}: {} event(s)", cycle, events);

                    let reports = std::mem::take(&mut scheduler.transport_mut().pending);
                    for report in reports {
                        writeln!(out, "cycle {:>4}: {}", cycle, describe(&report))?;
                        sent.push(report);
                    }
                }
            }
        }
    }

    log::info!(
        "{} cycle(s), {} report(s) sent, {}ms simulated",
        cycle,
        sent.len(),
        scheduler.delay().elapsed_us / 1000
    );
    Ok(())
}

/// Hex bytes followed by the decoded modifiers and keys.
pub fn describe(report: &KeyboardReport) -> String {
    let hex: Vec<String> = report.as_bytes().iter().map(|b| format!("{:02x}", b)).collect();

    let modifiers = Modifiers::from_bits_retain(report.modifiers);
    let mut names: Vec<&str> = modifiers.iter_names().map(|(name, _)| name).collect();
    names.extend(
        report
            .keys
            .iter()
            .filter(|&&code| code != 0)
            .map(|&code| key_name(code)),
    );

    if names.is_empty() {
        names.push("(none)");
    }

    format!("[{}] {}", hex.join(" "), names.join(" + "))
}

fn key_name(code: u8) -> &'static str {
    LAYOUT
        .iter()
        .filter(|entry| !entry.is_modifier())
        .find(|entry| entry.output_code() == code)
        .and_then(|entry| entry.keycode())
        .map(|kc| kc.display_name())
        .unwrap_or("?")
}
