//! Pipeline-specific error types.

use crate::pipeline::stage::StageName;
use thiserror::Error;

/// Errors that can occur while running the pipeline.
///
/// Filtering a value out is not an error; it is reported as
/// [`Outcome::FilteredOut`](crate::types::Outcome::FilteredOut).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage {stage} panicked")]
    StagePanicked { stage: StageName },

    #[error("Failed to spawn {stage} thread: {source}")]
    ThreadSpawn {
        stage: StageName,
        #[source]
        source: std::io::Error,
    },

    #[error("Run cancelled (partial total {partial_total})")]
    Cancelled { partial_total: i64 },

    #[error("Run did not complete within {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::StagePanicked {
            stage: StageName::SquareThreshold,
        };
        assert_eq!(err.to_string(), "Stage square-threshold panicked");

        let err = PipelineError::Cancelled { partial_total: 20 };
        assert!(err.to_string().contains("partial total 20"));
    }
}
