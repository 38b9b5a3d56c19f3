//! Node abstraction for the transform stages.
//!
//! The topology is fixed, so nodes are an enum rather than trait objects;
//! the match arms inline on the per-value hot path.

use crate::pipeline::nodes::{EvenFilterNode, SquareThresholdNode};

/// Enum dispatch for the filter/transform stages.
#[derive(Debug, Clone, Copy)]
pub enum TransformNode {
    EvenFilter(EvenFilterNode),
    SquareThreshold(SquareThresholdNode),
}

impl TransformNode {
    pub fn name(&self) -> &str {
        match self {
            TransformNode::EvenFilter(n) => n.name(),
            TransformNode::SquareThreshold(n) => n.name(),
        }
    }

    /// Map one input to zero or one output.
    pub fn process(&mut self, value: i64) -> Option<i64> {
        match self {
            TransformNode::EvenFilter(n) => n.process(value),
            TransformNode::SquareThreshold(n) => n.process(value),
        }
    }
}

impl From<EvenFilterNode> for TransformNode {
    fn from(node: EvenFilterNode) -> Self {
        TransformNode::EvenFilter(node)
    }
}

impl From<SquareThresholdNode> for TransformNode {
    fn from(node: SquareThresholdNode) -> Self {
        TransformNode::SquareThreshold(node)
    }
}
