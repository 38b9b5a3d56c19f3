//! Where per-value results go as they are produced.

use crate::types::RunResult;

/// Receives each per-value result, in issue order, as soon as it is known.
#[cfg_attr(test, mockall::automock)]
pub trait ResultReporter {
    fn report(&mut self, result: &RunResult);
}

/// Logs each result at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ResultReporter for TracingReporter {
    fn report(&mut self, result: &RunResult) {
        tracing::info!("{}", result);
    }
}

/// Keeps every result in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    results: Vec<RunResult>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<RunResult> {
        self.results
    }
}

impl ResultReporter for CollectingReporter {
    fn report(&mut self, result: &RunResult) {
        self.results.push(*result);
    }
}

impl<F> ResultReporter for F
where
    F: FnMut(&RunResult),
{
    fn report(&mut self, result: &RunResult) {
        self(result)
    }
}
