//! External collaborators of the discovery engine.
//!
//! Three boundaries, each an async trait so the engine can run against any
//! conforming backend:
//!
//! - [`Oracle`]: refines guidance, mutates programs and critiques outcomes.
//! - [`Evaluator`]: scores a program, reporting crashes as failure outcomes.
//! - [`EmbeddingSpace`]: maps a program to a vector for niche assignment.
//!
//! Gemini-backed, subprocess and fully offline implementations are provided.

#![deny(unsafe_code)]

pub mod config;
pub mod diff;
pub mod embedding;
pub mod error;
pub mod evaluator;
pub mod gemini;
pub mod oracle;
pub mod prompts;
pub mod simulated;

// ── Re-exports ──────────────────────────────────────────────────────

pub use config::{EvaluatorConfig, OracleBackend, OracleConfig, AUTH_ENV_VAR};
pub use diff::{AppliedDiff, DiffApplier};
pub use embedding::{EmbeddingSpace, HashedEmbedding};
pub use error::{EvaluationError, EvaluationResult, OracleError, OracleResult};
pub use evaluator::{parse_outcome, Evaluator, FnEvaluator, ProcessEvaluator, PYTHON_HARNESS};
pub use gemini::{GeminiClient, GeminiEmbedding, GeminiOracle, DEFAULT_GEMINI_ENDPOINT};
pub use oracle::{Oracle, Regression};
pub use prompts::PromptBuilder;
pub use simulated::{FailingOracle, SimulatedOracle};
