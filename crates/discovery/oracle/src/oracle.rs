use async_trait::async_trait;
use discovery_types::Outcome;

use crate::error::OracleResult;

/// A parent that outperformed the child derived from it.
#[derive(Clone, Copy, Debug)]
pub struct Regression<'a> {
    pub parent_guidance: &'a str,
    pub parent_program: &'a str,
    pub parent_outcome: &'a Outcome,
    pub child_program: &'a str,
    pub child_outcome: &'a Outcome,
}

/// Generative service that proposes mutations and improvement hints.
///
/// Critique methods must not return a hint equal (ignoring case and
/// whitespace) to one in `existing_hints`. Implementations must be safe to
/// call from many tasks at once.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Rewrite `previous` guidance so that it incorporates `hint`.
    async fn refine_guidance(
        &self,
        previous: &str,
        parent_program: &str,
        hint: &str,
    ) -> OracleResult<String>;

    /// Produce a child program from `parent_program` under `guidance`.
    async fn mutate(&self, parent_program: &str, guidance: &str) -> OracleResult<String>;

    /// Diagnose why a child scored below its parent.
    async fn critique_regression(
        &self,
        regression: &Regression<'_>,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>>;

    /// Propose next steps from a single program's outcome.
    async fn critique_outcome(
        &self,
        guidance: &str,
        program: &str,
        outcome: &Outcome,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>>;

    /// Name of this oracle.
    fn name(&self) -> &str;
}
