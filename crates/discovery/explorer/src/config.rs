use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do when an exploration task fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure, keep the inspiration pending and carry on.
    #[default]
    Skip,
    /// Cancel the rest of the generation and stop the run.
    Abort,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Number of generations per run.
    #[serde(default = "default_generations")]
    pub generations: usize,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Wall-clock budget for a single generation. Unlimited when absent.
    #[serde(default)]
    pub generation_timeout_secs: Option<u64>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            failure_policy: FailurePolicy::default(),
            generation_timeout_secs: None,
        }
    }
}

impl ExplorerConfig {
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_generation_timeout(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = Some(secs);
        self
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs.map(Duration::from_secs)
    }
}

fn default_generations() -> usize {
    20
}
