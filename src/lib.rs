//! # sumpipe-rs: three-stage concurrent filter/square/sum pipeline
//!
//! A batch of integers is pushed through three stages, each running on its
//! own thread and connected by bounded channels:
//!
//! 1. **EvenFilter** keeps even values.
//! 2. **SquareThreshold** squares them and keeps squares below 100 000.
//! 3. **Accumulator** adds every surviving square into a lock-guarded total.
//!
//! ## Run modes
//!
//! - **Persistent** (default): one set of stages for the whole batch, fed by
//!   a dedicated feeder thread. Returns the final total.
//! - **Per-value**: a fresh set of stages per input value, reporting the
//!   running total (or "filtered out") after each one.
//!
//! Both modes apply the same rules and produce the same final total.
//!
//! ## Example
//!
//! ```
//! use sumpipe_rs::{run_per_value, run_persistent, Outcome};
//!
//! let batch = [1, 2, 3, 4, 5, 6, 7, 7, 7, 10, 100, 1000, 2000, 3000];
//! assert_eq!(run_persistent(&batch).unwrap(), 10_156);
//!
//! let results = run_per_value(&[4, 5]).unwrap();
//! assert_eq!(results[0].outcome, Outcome::Total(16));
//! assert_eq!(results[1].outcome, Outcome::FilteredOut);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::{ChannelCapacities, PipelineConfig};
pub use error::{Result, ResultExt, SumPipeError};
pub use pipeline::{
    run_per_value, run_persistent, Pipeline, PipelineError, ResultReporter, ShutdownSignal,
};
pub use types::{Outcome, RunMode, RunOutcome, RunResult, RunStats};
