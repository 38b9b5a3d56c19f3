//! Core data types for sumpipe-rs
//!
//! This module defines the values that cross the orchestrator boundary:
//!
//! - [`RunMode`] - Which pipeline shape to run
//! - [`Outcome`] / [`RunResult`] - Per-value reporting
//! - [`RunOutcome`] - Result of a run in either mode
//! - [`RunStats`] - Counters collected from the stage reports

use crate::pipeline::stage::{StageName, StageReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The two pipeline shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Fresh stages and channels for every input value.
    PerValue,
    /// One set of stages for the whole batch, fed by a feeder thread.
    #[default]
    Persistent,
}

impl RunMode {
    pub const ALL: [RunMode; 2] = [RunMode::PerValue, RunMode::Persistent];

    pub fn display_name(&self) -> &'static str {
        match self {
            RunMode::PerValue => "per-value",
            RunMode::Persistent => "persistent",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What one value's trip through the pipeline produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The value reached the accumulator; carries the running total after it.
    Total(i64),
    /// The value was odd, or its square was too large.
    FilteredOut,
}

/// A batch value paired with its outcome, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub value: i64,
    pub outcome: Outcome,
}

impl RunResult {
    pub fn new(value: i64, outcome: Outcome) -> Self {
        Self { value, outcome }
    }

    /// Running total after this value, if it was not filtered out.
    pub fn total(&self) -> Option<i64> {
        match self.outcome {
            Outcome::Total(total) => Some(total),
            Outcome::FilteredOut => None,
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Total(total) => write!(f, "Number: {} - Result: {}", self.value, total),
            Outcome::FilteredOut => write!(f, "Number: {} - filtered out", self.value),
        }
    }
}

/// Result of [`Pipeline::run`](crate::pipeline::Pipeline::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    PerValue { results: Vec<RunResult>, total: i64 },
    Persistent { total: i64 },
}

impl RunOutcome {
    /// Accumulator value after the run, whatever the mode.
    pub fn total(&self) -> i64 {
        match self {
            RunOutcome::PerValue { total, .. } | RunOutcome::Persistent { total } => *total,
        }
    }

    pub fn mode(&self) -> RunMode {
        match self {
            RunOutcome::PerValue { .. } => RunMode::PerValue,
            RunOutcome::Persistent { .. } => RunMode::Persistent,
        }
    }
}

/// Counters for one persistent run, assembled from the stage reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Final accumulator value
    pub total: i64,
    /// Values in the input batch
    pub batch_len: u64,
    /// Values the feeder delivered to the first stage
    pub values_fed: u64,
    /// Values that passed the even filter
    pub evens_forwarded: u64,
    /// Squares that passed the threshold
    pub squares_forwarded: u64,
    /// Values added into the accumulator
    pub values_accumulated: u64,
    /// Wall-clock duration of the run in microseconds
    pub elapsed_us: u64,
}

impl RunStats {
    pub fn from_reports(
        batch_len: usize,
        reports: &[StageReport],
        total: i64,
        elapsed: Duration,
    ) -> Self {
        let mut stats = Self {
            total,
            batch_len: batch_len as u64,
            elapsed_us: elapsed.as_micros() as u64,
            ..Self::default()
        };
        for report in reports {
            match report.stage {
                StageName::Feeder => stats.values_fed = report.forwarded,
                StageName::EvenFilter => stats.evens_forwarded = report.forwarded,
                StageName::SquareThreshold => stats.squares_forwarded = report.forwarded,
                StageName::Accumulator => stats.values_accumulated = report.received,
            }
        }
        stats
    }

    /// Fraction of the batch that reached the accumulator, as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.batch_len == 0 {
            0.0
        } else {
            (self.values_accumulated as f64 / self.batch_len as f64) * 100.0
        }
    }
}
