//! Stage runners: the loops that move values between channels.
//!
//! Every runner follows the same protocol:
//! 1. Receive until the input is closed and drained (or shutdown fires).
//! 2. Close its output, if it owns one, exactly once.
//! 3. Return a [`StageReport`], which is its completion signal.
//!
//! A runner whose downstream has gone away keeps draining its input so the
//! upstream producer is never left blocked on a send.

use crate::pipeline::channel::{Delivery, StageReceiver, StageSender, StreamEvent};
use crate::pipeline::node::TransformNode;
use crate::pipeline::nodes::AccumulatorSink;
use crate::pipeline::shutdown::ShutdownSignal;
use std::fmt;

/// Identifies a pipeline thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Feeder,
    EvenFilter,
    SquareThreshold,
    Accumulator,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Feeder => "feeder",
            StageName::EvenFilter => "even-filter",
            StageName::SquareThreshold => "square-threshold",
            StageName::Accumulator => "accumulator",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TransformNode> for StageName {
    fn from(node: &TransformNode) -> Self {
        match node {
            TransformNode::EvenFilter(_) => StageName::EvenFilter,
            TransformNode::SquareThreshold(_) => StageName::SquareThreshold,
        }
    }
}

/// Counters a stage hands back when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: StageName,
    /// Values taken from the input (for the feeder: from the batch).
    pub received: u64,
    /// Values successfully sent downstream.
    pub forwarded: u64,
    /// True when the stage stopped because shutdown fired.
    pub interrupted: bool,
}

impl StageReport {
    pub fn new(stage: StageName) -> Self {
        Self {
            stage,
            received: 0,
            forwarded: 0,
            interrupted: false,
        }
    }
}

/// Write every batch value into `output` in order, then close it.
pub fn run_feeder(
    batch: Vec<i64>,
    output: StageSender<i64>,
    shutdown: &ShutdownSignal,
) -> StageReport {
    let mut report = StageReport::new(StageName::Feeder);

    for value in batch {
        report.received += 1;
        match output.send(value, shutdown) {
            Delivery::Sent => report.forwarded += 1,
            Delivery::Disconnected => {
                tracing::debug!("feeder: first stage is gone, stopping early");
                break;
            }
            Delivery::Interrupted => {
                report.interrupted = true;
                break;
            }
        }
    }

    output.close();
    tracing::debug!("feeder done: sent {} value(s)", report.forwarded);
    report
}

/// Run a filter/transform node over its input until exhaustion.
pub fn run_transform_stage(
    mut node: TransformNode,
    input: StageReceiver<i64>,
    output: StageSender<i64>,
    shutdown: &ShutdownSignal,
) -> StageReport {
    let stage = StageName::from(&node);
    let mut report = StageReport::new(stage);
    let mut downstream_open = true;
    tracing::debug!("{} started ({})", stage, node.name());

    loop {
        match input.recv(shutdown) {
            StreamEvent::Value(value) => {
                report.received += 1;
                let Some(out) = node.process(value) else {
                    tracing::trace!("{}: dropped {}", stage, value);
                    continue;
                };
                if !downstream_open {
                    continue;
                }
                match output.send(out, shutdown) {
                    Delivery::Sent => report.forwarded += 1,
                    Delivery::Disconnected => {
                        tracing::debug!("{}: downstream closed, draining input", stage);
                        downstream_open = false;
                    }
                    Delivery::Interrupted => {
                        report.interrupted = true;
                        break;
                    }
                }
            }
            StreamEvent::Closed => break,
            StreamEvent::Interrupted => {
                report.interrupted = true;
                break;
            }
        }
    }

    output.close();
    tracing::debug!(
        "{} done: {} in, {} out{}",
        stage,
        report.received,
        report.forwarded,
        if report.interrupted { " (interrupted)" } else { "" }
    );
    report
}

/// Per-value reducer: take at most one value, add it, forward the new total.
///
/// If the input closes empty, the output is closed without a value.
pub fn run_accumulator_once(
    mut sink: AccumulatorSink,
    input: StageReceiver<i64>,
    output: StageSender<i64>,
    shutdown: &ShutdownSignal,
) -> StageReport {
    let mut report = StageReport::new(StageName::Accumulator);

    match input.recv(shutdown) {
        StreamEvent::Value(value) => {
            report.received = 1;
            let total = sink.absorb(value);
            match output.send(total, shutdown) {
                Delivery::Sent => report.forwarded = 1,
                Delivery::Disconnected => {}
                Delivery::Interrupted => report.interrupted = true,
            }
        }
        StreamEvent::Closed => {}
        StreamEvent::Interrupted => report.interrupted = true,
    }

    output.close();
    report
}

/// Streaming reducer: add every value until the input is exhausted.
pub fn run_accumulator_streaming(
    mut sink: AccumulatorSink,
    input: StageReceiver<i64>,
    shutdown: &ShutdownSignal,
) -> StageReport {
    let mut report = StageReport::new(StageName::Accumulator);

    loop {
        match input.recv(shutdown) {
            StreamEvent::Value(value) => {
                report.received += 1;
                sink.absorb(value);
            }
            StreamEvent::Closed => break,
            StreamEvent::Interrupted => {
                report.interrupted = true;
                break;
            }
        }
    }

    tracing::debug!(
        "accumulator done: {} value(s), total {}",
        report.received,
        sink.accumulator().total()
    );
    report
}
