/// Errors from the oracle and embedding backends.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

/// Infrastructure failures of the evaluator.
///
/// A program that fails to run is not an error: it is reported as a
/// failure outcome with the reserved score.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("failed to launch evaluator `{command}`: {reason}")]
    Spawn { command: String, reason: String },
    #[error("evaluator i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

pub type OracleResult<T> = Result<T, OracleError>;
pub type EvaluationResult<T> = Result<T, EvaluationError>;
