//! Error types for the exploration scheduler.

use discovery_oracle::{EvaluationError, OracleError};
use discovery_population::PopulationError;
use thiserror::Error;

/// Errors raised while running generations.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("population error: {0}")]
    Population(#[from] PopulationError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// A task failed under the abort policy. Commits made by tasks that
    /// finished earlier in the generation are kept.
    #[error("generation {generation} aborted after {succeeded} succeeded, {failed} failed: {reason}")]
    GenerationAborted {
        generation: usize,
        succeeded: usize,
        failed: usize,
        reason: String,
    },

    #[error("exploration cancelled during generation {generation}")]
    Cancelled { generation: usize },

    #[error("generation {generation} timed out after {secs}s")]
    Timeout { generation: usize, secs: u64 },
}

impl ExplorerError {
    /// Errors that end the whole run whatever the failure policy says.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Population(e) => e.is_invariant_breach(),
            Self::Cancelled { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Result type for scheduler operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;
