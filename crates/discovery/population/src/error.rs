//! Error types for the population store.

use discovery_types::CandidateId;
use thiserror::Error;

/// Errors raised by population operations.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// Sampling or best-of on a store with no candidates.
    #[error("population is empty")]
    EmptyPopulation,

    /// A zero-norm vector took part in a similarity comparison.
    #[error("degenerate embedding: {0}")]
    DegenerateVector(String),

    /// Two embeddings of different length were compared.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An operation referenced a candidate that does not exist.
    #[error("unknown candidate: {0}")]
    UnknownCandidate(CandidateId),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

impl PopulationError {
    /// True for errors that signal a broken store invariant rather than bad input.
    pub fn is_invariant_breach(&self) -> bool {
        matches!(self, Self::UnknownCandidate(_))
    }
}

/// Result type for population operations.
pub type PopulationResult<T> = Result<T, PopulationError>;
