//! Offline oracles for tests and dry runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use discovery_types::{dedupe_hints, Outcome};

use crate::error::{OracleError, OracleResult};
use crate::oracle::{Oracle, Regression};

/// A deterministic oracle that never leaves the process.
///
/// Mutation appends one comment line derived from the guidance, so every
/// child differs from its parent. Critiques return numbered hints that are
/// unique for the lifetime of the oracle. Regression hints start with
/// `regression`, outcome hints with `refine`.
#[derive(Debug)]
pub struct SimulatedOracle {
    counter: AtomicU64,
    hints_per_critique: usize,
    failure_marker: Option<String>,
    latency: Option<Duration>,
}

impl SimulatedOracle {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            hints_per_critique: 1,
            failure_marker: None,
            latency: None,
        }
    }

    pub fn with_hints_per_critique(mut self, count: usize) -> Self {
        self.hints_per_critique = count;
        self
    }

    /// Fail `mutate` whenever the guidance contains `marker`.
    pub fn with_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.failure_marker = Some(marker.into());
        self
    }

    /// Sleep before every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn numbered(&self, prefix: &str, detail: &str, existing_hints: &[String]) -> Vec<String> {
        let fresh = (0..self.hints_per_critique)
            .map(|_| {
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                format!("{} {}: {}", prefix, n, detail)
            })
            .collect();
        dedupe_hints(fresh, existing_hints)
    }
}

impl Default for SimulatedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Oracle for SimulatedOracle {
    async fn refine_guidance(
        &self,
        previous: &str,
        _parent_program: &str,
        hint: &str,
    ) -> OracleResult<String> {
        self.pause().await;
        Ok(format!("{}\n- {}", previous.trim_end(), hint.trim()))
    }

    async fn mutate(&self, parent_program: &str, guidance: &str) -> OracleResult<String> {
        self.pause().await;
        if let Some(marker) = &self.failure_marker {
            if guidance.contains(marker.as_str()) {
                return Err(OracleError::Generation(format!(
                    "simulated failure on guidance containing {:?}",
                    marker
                )));
            }
        }
        let focus = guidance
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("baseline")
            .trim_start_matches("- ")
            .trim();
        Ok(format!("{}\n# applied: {}\n", parent_program.trim_end(), focus))
    }

    async fn critique_regression(
        &self,
        regression: &Regression<'_>,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>> {
        self.pause().await;
        let detail = format!(
            "score fell from {} to {}",
            regression.parent_outcome.score(),
            regression.child_outcome.score()
        );
        Ok(self.numbered("regression", &detail, existing_hints))
    }

    async fn critique_outcome(
        &self,
        _guidance: &str,
        _program: &str,
        outcome: &Outcome,
        existing_hints: &[String],
    ) -> OracleResult<Vec<String>> {
        self.pause().await;
        let detail = format!("build on score {}", outcome.score());
        Ok(self.numbered("refine", &detail, existing_hints))
    }

    fn name(&self) -> &str {
        "simulated-oracle"
    }
}

/// An oracle whose every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    async fn refine_guidance(&self, _: &str, _: &str, _: &str) -> OracleResult<String> {
        Err(OracleError::Generation("oracle unavailable".into()))
    }

    async fn mutate(&self, _: &str, _: &str) -> OracleResult<String> {
        Err(OracleError::Generation("oracle unavailable".into()))
    }

    async fn critique_regression(
        &self,
        _: &Regression<'_>,
        _: &[String],
    ) -> OracleResult<Vec<String>> {
        Err(OracleError::Generation("oracle unavailable".into()))
    }

    async fn critique_outcome(
        &self,
        _: &str,
        _: &str,
        _: &Outcome,
        _: &[String],
    ) -> OracleResult<Vec<String>> {
        Err(OracleError::Generation("oracle unavailable".into()))
    }

    fn name(&self) -> &str {
        "failing-oracle"
    }
}
