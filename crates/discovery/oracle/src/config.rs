use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embedding::{EmbeddingSpace, HashedEmbedding};
use crate::error::{EvaluationResult, OracleError, OracleResult};
use crate::evaluator::{Evaluator, ProcessEvaluator};
use crate::gemini::{GeminiClient, GeminiEmbedding, GeminiOracle, DEFAULT_GEMINI_ENDPOINT};
use crate::oracle::Oracle;
use crate::simulated::SimulatedOracle;

/// Environment variable consulted when no API key is configured.
pub const AUTH_ENV_VAR: &str = "GEMINI_API_KEY";

/// Which generative backend drives the oracle and embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleBackend {
    /// Offline deterministic oracle with hashed embeddings.
    #[default]
    Simulated,
    /// Google Gemini over HTTPS.
    Gemini,
}

/// Oracle and embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub backend: OracleBackend,

    /// Falls back to `GEMINI_API_KEY` when unset.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model that writes program diffs.
    #[serde(default = "default_mutation_model")]
    pub mutation_model: String,

    /// Model that refines guidance and produces hints.
    #[serde(default = "default_critique_model")]
    pub critique_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Dimensions of the local hashed embedding.
    #[serde(default = "default_hashed_dimensions")]
    pub hashed_dimensions: usize,

    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: OracleBackend::default(),
            api_key: None,
            endpoint: default_endpoint(),
            mutation_model: default_mutation_model(),
            critique_model: default_critique_model(),
            embedding_model: default_embedding_model(),
            hashed_dimensions: default_hashed_dimensions(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

impl OracleConfig {
    fn api_key(&self) -> OracleResult<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(AUTH_ENV_VAR).ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                OracleError::InvalidConfig(format!(
                    "gemini backend requires an api key (set {})",
                    AUTH_ENV_VAR
                ))
            })
    }

    fn gemini_client(&self) -> OracleResult<GeminiClient> {
        GeminiClient::new(
            self.api_key()?,
            self.endpoint.clone(),
            Duration::from_secs(self.timeout_secs),
        )
    }

    /// Build the configured oracle.
    pub fn build_oracle(&self) -> OracleResult<Arc<dyn Oracle>> {
        match self.backend {
            OracleBackend::Simulated => Ok(Arc::new(SimulatedOracle::new())),
            OracleBackend::Gemini => Ok(Arc::new(GeminiOracle::new(
                self.gemini_client()?,
                self.mutation_model.clone(),
                self.critique_model.clone(),
            )?)),
        }
    }

    /// Build the configured embedding space.
    pub fn build_embedding(&self) -> OracleResult<Arc<dyn EmbeddingSpace>> {
        match self.backend {
            OracleBackend::Simulated => Ok(Arc::new(HashedEmbedding::new(self.hashed_dimensions)?)),
            OracleBackend::Gemini => Ok(Arc::new(GeminiEmbedding::new(
                self.gemini_client()?,
                self.embedding_model.clone(),
            ))),
        }
    }
}

/// Subprocess evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Program and arguments. Empty runs the built-in Python harness.
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default = "default_evaluator_timeout")]
    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: default_evaluator_timeout(),
        }
    }
}

impl EvaluatorConfig {
    /// Build a process evaluator, optionally bound to evaluator source.
    pub fn build_evaluator(
        &self,
        evaluator_program: Option<&str>,
    ) -> EvaluationResult<Arc<dyn Evaluator>> {
        let mut evaluator = ProcessEvaluator::from_config(self)?;
        if let Some(source) = evaluator_program.filter(|s| !s.trim().is_empty()) {
            evaluator = evaluator.with_evaluator_program(source);
        }
        Ok(Arc::new(evaluator))
    }
}

fn default_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_mutation_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_critique_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_embedding_model() -> String {
    "gemini-embedding-001".to_string()
}

fn default_hashed_dimensions() -> usize {
    HashedEmbedding::DEFAULT_DIMENSIONS
}

fn default_oracle_timeout() -> u64 {
    60
}

fn default_evaluator_timeout() -> u64 {
    30
}
