//! Built-in pipeline node implementations.

pub mod accumulator_sink;
pub mod even_filter;
pub mod square_threshold;

pub use accumulator_sink::AccumulatorSink;
pub use even_filter::EvenFilterNode;
pub use square_threshold::SquareThresholdNode;
