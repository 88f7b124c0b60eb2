use super::state::{ConvergenceReason, StepRecord};
use tracing::info;

/// Destination of the human-readable run report.
pub trait ReportSink {
    fn write_line(&mut self, line: String);
}

/// Report lines kept in memory. Every line is also emitted as an `info` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The report as text, one line per entry and a trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl ReportSink for Report {
    fn write_line(&mut self, line: String) {
        info!(target: "foldsketch::report", "{}", line);
        self.lines.push(line);
    }
}

pub const CHAIN_SEPARATOR: &str = "------------------";

pub fn column_header() -> String {
    format!(
        "{:>8}{:>10}{:>10}{:>6}{:>10}{:>8}",
        "Step", "energy", "F_max", "T", "h", "res(max_F)"
    )
}

/// One report row; `residue` names the residue carrying the largest force.
pub fn record_line(record: &StepRecord, residue: &str) -> String {
    format!(
        "{:>8}{:>10}{:>10}{:>6.1}{:>10}{:>8}",
        record.step,
        scientific(record.energy, 2),
        scientific(record.max_force, 2),
        record.temperature,
        scientific(record.step_size, 2),
        residue
    )
}

pub fn convergence_line(reason: ConvergenceReason, steps: usize) -> String {
    match reason {
        ConvergenceReason::ThresholdReached => format!(
            "Converged at {} steps. You can play with the temperature (-T).",
            steps
        ),
        ConvergenceReason::MaxStepsReached => {
            format!("Reached maximum number of {} steps", steps)
        }
    }
}

pub fn summary_line(steps: usize) -> String {
    format!("{} steps of minimization", steps)
}

/// Formats `value` as `d.dde+XX`, with a signed exponent of at least two digits.
pub fn scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}
