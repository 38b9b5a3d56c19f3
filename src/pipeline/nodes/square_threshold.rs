//! SquareThresholdNode - second stage, squares and drops large results.

use crate::pipeline::primitives::{square_below, SQUARE_THRESHOLD};

/// Squares each value and passes the square only when it is strictly below
/// `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct SquareThresholdNode {
    threshold: i64,
}

impl SquareThresholdNode {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn name(&self) -> &str {
        "SquareThreshold"
    }

    pub fn process(&mut self, value: i64) -> Option<i64> {
        square_below(value, self.threshold)
    }
}

impl Default for SquareThresholdNode {
    fn default() -> Self {
        Self::new(SQUARE_THRESHOLD)
    }
}
