//! Error types for discoveryd

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use discovery_explorer::ExplorerError;
use discovery_oracle::{EvaluationError, OracleError};
use discovery_population::PopulationError;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Request rejected before a run started
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Evaluator error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Population error: {0}")]
    Population(#[from] PopulationError),

    #[error("Exploration error: {0}")]
    Exploration(#[from] ExplorerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(e: config::ConfigError) -> Self {
        DaemonError::Config(e.to_string())
    }
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The run was cancelled or ran out of time
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// A generation failed under the abort policy
    #[error("Exploration failed: {0}")]
    Exploration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DaemonError> for ApiError {
    fn from(e: DaemonError) -> Self {
        match e {
            DaemonError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            DaemonError::Exploration(
                ref inner @ (ExplorerError::Cancelled { .. } | ExplorerError::Timeout { .. }),
            ) => ApiError::Unavailable(inner.to_string()),
            DaemonError::Exploration(inner) => ApiError::Exploration(inner.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Exploration(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXPLORATION_FAILED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unavailable("test".to_string()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("test".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_daemon_error_mapping() {
        let cancelled = DaemonError::Exploration(ExplorerError::Cancelled { generation: 2 });
        assert!(matches!(ApiError::from(cancelled), ApiError::Unavailable(_)));

        let invalid = DaemonError::InvalidRequest("empty program".into());
        assert!(matches!(ApiError::from(invalid), ApiError::BadRequest(_)));

        let empty = DaemonError::Population(PopulationError::EmptyPopulation);
        assert!(matches!(ApiError::from(empty), ApiError::Internal(_)));
    }

    #[test]
    fn test_error_display() {
        let err = DaemonError::Config("missing file".into());
        assert_eq!(err.to_string(), "Configuration error: missing file");
    }
}
