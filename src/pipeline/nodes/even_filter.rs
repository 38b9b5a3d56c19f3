//! EvenFilterNode - first stage, keeps even values only.

use crate::pipeline::primitives::is_even;

/// Passes a value through unchanged when it is even, drops it otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenFilterNode;

impl EvenFilterNode {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &str {
        "EvenFilter"
    }

    pub fn process(&mut self, value: i64) -> Option<i64> {
        is_even(value).then_some(value)
    }
}
