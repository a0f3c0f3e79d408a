//! Population tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::{PopulationError, PopulationResult};

/// Configuration for niche allocation and parent sampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Maximum number of niches. New niches are allocated until this is reached.
    #[serde(default = "default_niche_capacity")]
    pub niche_capacity: usize,

    /// Probability of swapping the sampled niche for a different one.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Cap on pending inspirations handed out per sample.
    #[serde(default = "default_max_inspirations")]
    pub max_inspirations_per_round: usize,

    /// Number of top-scoring candidates per niche eligible as parents.
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,

    /// Seed for the sampling RNG. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            niche_capacity: default_niche_capacity(),
            mutation_rate: default_mutation_rate(),
            max_inspirations_per_round: default_max_inspirations(),
            elite_count: default_elite_count(),
            seed: None,
        }
    }
}

fn default_niche_capacity() -> usize {
    5
}

fn default_mutation_rate() -> f64 {
    0.1
}

fn default_max_inspirations() -> usize {
    5
}

fn default_elite_count() -> usize {
    5
}

impl PopulationConfig {
    pub fn validate(&self) -> PopulationResult<()> {
        if self.niche_capacity == 0 {
            return Err(PopulationError::InvalidConfig(
                "niche_capacity must be at least 1".into(),
            ));
        }
        if u32::try_from(self.niche_capacity).is_err() {
            return Err(PopulationError::InvalidConfig(format!(
                "niche_capacity must be at most {}, got {}",
                u32::MAX,
                self.niche_capacity
            )));
        }
        if self.elite_count == 0 {
            return Err(PopulationError::InvalidConfig(
                "elite_count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PopulationError::InvalidConfig(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_niche_capacity(mut self, capacity: usize) -> Self {
        self.niche_capacity = capacity;
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_max_inspirations(mut self, max: usize) -> Self {
        self.max_inspirations_per_round = max;
        self
    }
}
