//! Three-stage concurrent pipeline.
//!
//! Values flow through fixed stages, each on its own thread, connected by
//! bounded crossbeam channels:
//!
//! ```text
//! [EvenFilter] ──► [SquareThreshold] ──► [Accumulator]
//! ```
//!
//! # Design
//!
//! - **Explicit end-of-stream** - receives yield `StreamEvent::{Value, Closed,
//!   Interrupted}`; a channel is closed by consuming its only `StageSender`.
//! - **Enum dispatch** - `TransformNode` for the filter/transform stages.
//! - **Completion signal** - every runner returns a `StageReport`; `StageGroup`
//!   is the join barrier.
//! - **Scoped state** - each run builds its own `Accumulator`.
//! - **Cancellation** - `ShutdownSignal` is observed at every blocking point.

pub mod accumulator;
pub mod barrier;
pub mod channel;
pub mod error;
pub mod executor;
pub mod node;
pub mod nodes;
pub mod primitives;
pub mod report;
pub mod shutdown;
pub mod stage;

pub use accumulator::Accumulator;
pub use barrier::{StageGroup, WaitOutcome};
pub use channel::{channel, Delivery, StageReceiver, StageSender, StreamEvent};
pub use error::{PipelineError, PipelineResult};
pub use executor::{run_per_value, run_persistent, Pipeline};
pub use node::TransformNode;
pub use primitives::{below_threshold, is_even, square, square_below, SQUARE_THRESHOLD};
pub use report::{CollectingReporter, ResultReporter, TracingReporter};
pub use shutdown::ShutdownSignal;
pub use stage::{StageName, StageReport};
