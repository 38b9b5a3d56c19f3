//! Pipeline orchestrator - wires the stages, feeds the batch, joins.
//!
//! Both run shapes use the same three nodes:
//!
//! ```text
//! [feeder] ─input─► [EvenFilter] ─filtered─► [SquareThreshold] ─squared─► [Accumulator]
//! ```
//!
//! - **Persistent**: the stages above are built once for the whole batch and
//!   the accumulator streams.
//! - **Per-value**: the orchestrator itself sends one value, the accumulator
//!   takes at most one value and answers on a `results` channel, and the
//!   whole set is torn down before the next value.
//!
//! Each run owns a fresh [`Accumulator`]; its total is read only after the
//! join barrier.

use crate::config::{ChannelCapacities, PipelineConfig};
use crate::pipeline::accumulator::Accumulator;
use crate::pipeline::barrier::{StageGroup, WaitOutcome};
use crate::pipeline::channel::{channel, Delivery, StreamEvent};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::node::TransformNode;
use crate::pipeline::nodes::{AccumulatorSink, EvenFilterNode, SquareThresholdNode};
use crate::pipeline::report::{ResultReporter, TracingReporter};
use crate::pipeline::shutdown::ShutdownSignal;
use crate::pipeline::stage::{
    run_accumulator_once, run_accumulator_streaming, run_feeder, run_transform_stage, StageName,
};
use crate::types::{Outcome, RunMode, RunOutcome, RunResult, RunStats};
use std::time::Instant;

/// Runs batches through the three-stage pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `batch` in the configured default mode.
    pub fn run_default(&self, batch: &[i64]) -> PipelineResult<RunOutcome> {
        self.run(self.config.default_mode, batch)
    }

    pub fn run(&self, mode: RunMode, batch: &[i64]) -> PipelineResult<RunOutcome> {
        match mode {
            RunMode::PerValue => {
                let results = self.run_per_value(batch)?;
                let total = results.iter().rev().find_map(RunResult::total).unwrap_or(0);
                Ok(RunOutcome::PerValue { results, total })
            }
            RunMode::Persistent => {
                let total = self.run_persistent(batch)?;
                Ok(RunOutcome::Persistent { total })
            }
        }
    }

    // ── Per-value mode ──

    /// One short-lived pipeline per value; results are logged as they arrive.
    pub fn run_per_value(&self, batch: &[i64]) -> PipelineResult<Vec<RunResult>> {
        self.run_per_value_with(batch, &mut TracingReporter)
    }

    /// Like [`run_per_value`](Self::run_per_value), handing each result to
    /// `reporter` before the next value is issued.
    pub fn run_per_value_with<R>(
        &self,
        batch: &[i64],
        reporter: &mut R,
    ) -> PipelineResult<Vec<RunResult>>
    where
        R: ResultReporter + ?Sized,
    {
        tracing::info!("Per-value run over {} value(s)", batch.len());
        let accumulator = Accumulator::new();
        let shutdown = ShutdownSignal::new();
        let mut results = Vec::with_capacity(batch.len());

        for &value in batch {
            let result = self.run_single(value, &accumulator, &shutdown)?;
            reporter.report(&result);
            results.push(result);
        }

        tracing::info!("Per-value run finished, total {}", accumulator.total());
        Ok(results)
    }

    fn run_single(
        &self,
        value: i64,
        accumulator: &Accumulator,
        shutdown: &ShutdownSignal,
    ) -> PipelineResult<RunResult> {
        let caps = self.config.per_value;
        let (input_tx, input_rx) = channel(caps.input);
        let (filtered_tx, filtered_rx) = channel(caps.filtered);
        let (squared_tx, squared_rx) = channel(caps.squared);
        let (results_tx, results_rx) = channel(caps.results);

        let mut group = StageGroup::new();
        let (filter, square) = self.transform_nodes();

        let signal = shutdown.clone();
        group.spawn(StageName::EvenFilter, move || {
            run_transform_stage(filter, input_rx, filtered_tx, &signal)
        })?;
        let signal = shutdown.clone();
        group.spawn(StageName::SquareThreshold, move || {
            run_transform_stage(square, filtered_rx, squared_tx, &signal)
        })?;
        let signal = shutdown.clone();
        let sink = AccumulatorSink::new(accumulator.clone());
        group.spawn(StageName::Accumulator, move || {
            run_accumulator_once(sink, squared_rx, results_tx, &signal)
        })?;

        // A failed send means the first stage died; the join reports why.
        if input_tx.send(value, shutdown) != Delivery::Sent {
            tracing::warn!("First stage refused value {}", value);
        }
        input_tx.close();

        let outcome = match results_rx.recv(shutdown) {
            StreamEvent::Value(total) => Outcome::Total(total),
            StreamEvent::Closed | StreamEvent::Interrupted => Outcome::FilteredOut,
        };

        group.wait_until(None);
        group.join()?;

        tracing::trace!("value {} -> {:?}", value, outcome);
        Ok(RunResult::new(value, outcome))
    }

    // ── Persistent mode ──

    /// One long-lived pipeline for the whole batch; returns the final total.
    pub fn run_persistent(&self, batch: &[i64]) -> PipelineResult<i64> {
        Ok(self.run_persistent_with_stats(batch)?.total)
    }

    pub fn run_persistent_with_stats(&self, batch: &[i64]) -> PipelineResult<RunStats> {
        self.run_persistent_until(batch, &ShutdownSignal::new())
    }

    /// Persistent run that stops early when `shutdown` fires.
    ///
    /// The stages run under a signal private to this run. `shutdown` is only
    /// observed, so it stays usable for later runs. If the configured run
    /// deadline passes first, the run fails with [`PipelineError::Timeout`].
    pub fn run_persistent_until(
        &self,
        batch: &[i64],
        shutdown: &ShutdownSignal,
    ) -> PipelineResult<RunStats> {
        if shutdown.is_triggered() {
            tracing::warn!("Shutdown already requested, not starting run");
            return Err(PipelineError::Cancelled { partial_total: 0 });
        }

        let started = Instant::now();
        let deadline = self.config.run_timeout().map(|timeout| started + timeout);
        tracing::info!("Persistent run over {} value(s)", batch.len());

        let accumulator = Accumulator::new();
        let run_signal = ShutdownSignal::new();
        let mut group = self.launch_persistent(batch, &accumulator, &run_signal)?;

        let waited = group.wait_or_stop(deadline, shutdown);
        match waited {
            WaitOutcome::Completed => {}
            WaitOutcome::DeadlineExpired => {
                tracing::warn!("Run deadline passed, shutting the pipeline down");
                run_signal.trigger();
            }
            WaitOutcome::Stopped => {
                tracing::debug!("Shutdown requested, stopping stages");
                run_signal.trigger();
            }
        }
        let reports = group.join()?;
        let total = accumulator.total();

        if waited == WaitOutcome::DeadlineExpired {
            return Err(PipelineError::Timeout {
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
        if reports.iter().any(|r| r.interrupted) {
            tracing::warn!("Run cancelled with partial total {}", total);
            return Err(PipelineError::Cancelled {
                partial_total: total,
            });
        }

        let stats = RunStats::from_reports(batch.len(), &reports, total, started.elapsed());
        tracing::info!(
            "Persistent run finished: total {} ({} of {} value(s) accumulated) in {} us",
            stats.total,
            stats.values_accumulated,
            stats.batch_len,
            stats.elapsed_us
        );
        Ok(stats)
    }

    fn launch_persistent(
        &self,
        batch: &[i64],
        accumulator: &Accumulator,
        shutdown: &ShutdownSignal,
    ) -> PipelineResult<StageGroup> {
        let ChannelCapacities {
            input,
            filtered,
            squared,
            ..
        } = self.config.persistent;
        let (input_tx, input_rx) = channel(input);
        let (filtered_tx, filtered_rx) = channel(filtered);
        let (squared_tx, squared_rx) = channel(squared);

        let mut group = StageGroup::new();
        let (filter, square) = self.transform_nodes();

        let signal = shutdown.clone();
        group.spawn(StageName::EvenFilter, move || {
            run_transform_stage(filter, input_rx, filtered_tx, &signal)
        })?;
        let signal = shutdown.clone();
        group.spawn(StageName::SquareThreshold, move || {
            run_transform_stage(square, filtered_rx, squared_tx, &signal)
        })?;
        let signal = shutdown.clone();
        let sink = AccumulatorSink::new(accumulator.clone());
        group.spawn(StageName::Accumulator, move || {
            run_accumulator_streaming(sink, squared_rx, &signal)
        })?;

        // The feeder runs on its own thread so the orchestrator is free to
        // wait on the barrier while values are still flowing.
        let signal = shutdown.clone();
        let batch = batch.to_vec();
        group.spawn(StageName::Feeder, move || run_feeder(batch, input_tx, &signal))?;
        tracing::debug!("Launched {} pipeline thread(s)", group.len());

        Ok(group)
    }

    fn transform_nodes(&self) -> (TransformNode, TransformNode) {
        (
            EvenFilterNode::new().into(),
            SquareThresholdNode::new(self.config.threshold).into(),
        )
    }
}

/// Per-value run with the default configuration.
pub fn run_per_value(batch: &[i64]) -> PipelineResult<Vec<RunResult>> {
    Pipeline::default().run_per_value(batch)
}

/// Persistent run with the default configuration.
pub fn run_persistent(batch: &[i64]) -> PipelineResult<i64> {
    Pipeline::default().run_persistent(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::{CollectingReporter, MockResultReporter};
    use mockall::Sequence;
    use std::time::Duration;

    const SAMPLE_BATCH: [i64; 14] = [1, 2, 3, 4, 5, 6, 7, 7, 7, 10, 100, 1000, 2000, 3000];

    #[test]
    fn test_persistent_sample_batch() {
        assert_eq!(run_persistent(&SAMPLE_BATCH).unwrap(), 10_156);
    }

    #[test]
    fn test_persistent_stats() {
        let stats = Pipeline::default()
            .run_persistent_with_stats(&SAMPLE_BATCH)
            .unwrap();
        assert_eq!(stats.total, 10_156);
        assert_eq!(stats.batch_len, 14);
        assert_eq!(stats.values_fed, 14);
        assert_eq!(stats.evens_forwarded, 8);
        assert_eq!(stats.squares_forwarded, 5);
        assert_eq!(stats.values_accumulated, 5);
    }

    #[test]
    fn test_per_value_single_even() {
        let results = run_per_value(&[4]).unwrap();
        assert_eq!(results, vec![RunResult::new(4, Outcome::Total(16))]);
    }

    #[test]
    fn test_per_value_single_odd() {
        let results = run_per_value(&[5]).unwrap();
        assert_eq!(results, vec![RunResult::new(5, Outcome::FilteredOut)]);
    }

    #[test]
    fn test_per_value_running_total() {
        let results = run_per_value(&[1, 2, 3, 4, 400, 10]).unwrap();
        let outcomes: Vec<Outcome> = results.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::FilteredOut,
                Outcome::Total(4),
                Outcome::FilteredOut,
                Outcome::Total(20),
                Outcome::FilteredOut,
                Outcome::Total(120),
            ]
        );
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(run_persistent(&[]).unwrap(), 0);
        assert!(run_per_value(&[]).unwrap().is_empty());

        let stats = Pipeline::default().run_persistent_with_stats(&[]).unwrap();
        assert_eq!(stats.values_fed, 0);
        assert_eq!(stats.values_accumulated, 0);
    }

    #[test]
    fn test_run_dispatches_on_mode() {
        let pipeline = Pipeline::default();
        for mode in RunMode::ALL {
            let outcome = pipeline.run(mode, &SAMPLE_BATCH).unwrap();
            assert_eq!(outcome.mode(), mode);
            assert_eq!(outcome.total(), 10_156, "mode {}", mode);
        }
    }

    #[test]
    fn test_run_default_uses_configured_mode() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_mode(RunMode::PerValue));
        let outcome = pipeline.run_default(&[2, 4]).unwrap();
        assert_eq!(outcome.mode(), RunMode::PerValue);
        assert_eq!(outcome.total(), 20);
    }

    #[test]
    fn test_custom_threshold() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_threshold(50));
        // Only 2, 4 and 6 square below 50.
        assert_eq!(pipeline.run_persistent(&SAMPLE_BATCH).unwrap(), 4 + 16 + 36);
    }

    #[test]
    fn test_reporter_sees_results_in_issue_order() {
        let mut reporter = MockResultReporter::new();
        let mut seq = Sequence::new();
        for (value, outcome) in [
            (6, Outcome::Total(36)),
            (7, Outcome::FilteredOut),
            (2, Outcome::Total(40)),
        ] {
            reporter
                .expect_report()
                .withf(move |r| r.value == value && r.outcome == outcome)
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }

        Pipeline::default()
            .run_per_value_with(&[6, 7, 2], &mut reporter)
            .unwrap();
    }

    #[test]
    fn test_collecting_reporter_matches_returned_results() {
        let mut reporter = CollectingReporter::new();
        let results = Pipeline::default()
            .run_per_value_with(&SAMPLE_BATCH, &mut reporter)
            .unwrap();
        assert_eq!(reporter.results(), results.as_slice());
        assert_eq!(results.last().unwrap().value, 3000);
    }

    #[test]
    fn test_pre_triggered_shutdown_cancels() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let err = Pipeline::default()
            .run_persistent_until(&SAMPLE_BATCH, &signal)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { partial_total: 0 }));
    }

    #[test]
    fn test_fresh_runs_do_not_share_state() {
        let pipeline = Pipeline::default();
        let first = pipeline.run_persistent(&SAMPLE_BATCH).unwrap();
        let second = pipeline.run_persistent(&SAMPLE_BATCH).unwrap();
        assert_eq!(first, second);

        let first = pipeline.run_per_value(&[2, 4]).unwrap();
        let second = pipeline.run_per_value(&[2, 4]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generous_deadline_does_not_fire() {
        let pipeline = Pipeline::new(
            PipelineConfig::default().with_run_timeout(Duration::from_secs(10)),
        );
        assert_eq!(pipeline.run_persistent(&SAMPLE_BATCH).unwrap(), 10_156);
    }

    #[test]
    fn test_timeout_leaves_caller_signal_reusable() {
        let signal = ShutdownSignal::new();
        let batch: Vec<i64> = (0..2_000_000).collect();
        let pipeline =
            Pipeline::new(PipelineConfig::default().with_run_timeout(Duration::from_millis(1)));

        let err = pipeline.run_persistent_until(&batch, &signal).unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { .. }));
        assert!(!signal.is_triggered());

        let stats = Pipeline::default()
            .run_persistent_until(&[2, 4], &signal)
            .unwrap();
        assert_eq!(stats.total, 20);
    }
}
