//! AccumulatorSink - final stage, folds values into the shared total.

use crate::pipeline::accumulator::Accumulator;

/// Adds every value it absorbs to an [`Accumulator`].
#[derive(Debug, Clone)]
pub struct AccumulatorSink {
    accumulator: Accumulator,
}

impl AccumulatorSink {
    pub fn new(accumulator: Accumulator) -> Self {
        Self { accumulator }
    }

    /// Add `value` under the lock and return the new running total.
    pub fn absorb(&mut self, value: i64) -> i64 {
        let total = self.accumulator.add(value);
        tracing::trace!("Accumulated {} -> total {}", value, total);
        total
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }
}
