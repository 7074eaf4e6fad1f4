//! Per-line results of a batch run.

use std::fmt;

use uuid::Uuid;

use crate::pipeline::driver::LineError;
use crate::submission::TerminalOutcome;

/// What happened to one input line.
#[derive(Debug)]
pub enum LineOutcome {
    /// Printed only; not signed.
    Previewed,
    /// Signed and appended to the output file.
    Written,
    /// Signed and driven through submission.
    Submitted(TerminalOutcome),
    /// Rejected locally and skipped.
    Skipped(LineError),
}

#[derive(Debug)]
pub struct LineReport {
    /// 1-based line number in the input.
    pub line: usize,
    pub outcome: LineOutcome,
}

/// Outcome of every processed line, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub lines: Vec<LineReport>,
}

/// Counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub previewed: usize,
    pub written: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: usize, outcome: LineOutcome) {
        self.lines.push(LineReport { line, outcome });
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for report in &self.lines {
            match &report.outcome {
                LineOutcome::Previewed => summary.previewed += 1,
                LineOutcome::Written => summary.written += 1,
                LineOutcome::Submitted(outcome) if outcome.is_success() => summary.succeeded += 1,
                LineOutcome::Submitted(_) => summary.failed += 1,
                LineOutcome::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }

    /// Lines that did not reach their intended destination.
    pub fn problems(&self) -> impl Iterator<Item = &LineReport> {
        self.lines.iter().filter(|r| match &r.outcome {
            LineOutcome::Submitted(outcome) => !outcome.is_success(),
            LineOutcome::Skipped(_) => true,
            _ => false,
        })
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} previewed, {} written, {} submitted, {} failed, {} skipped",
            self.previewed, self.written, self.succeeded, self.failed, self.skipped
        )
    }
}
