//! One-shot discovery runs.
//!
//! Every request gets a fresh population; the oracle and embedding backends
//! are shared between requests.

use std::sync::Arc;

use discovery_explorer::{Collaborators, ExplorationScheduler, ExplorerConfig, RunReport};
use discovery_oracle::{EmbeddingSpace, Evaluator, EvaluatorConfig, Oracle};
use discovery_population::{PopulationConfig, PopulationStore};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};

/// Inputs of a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    /// Python source defining `evaluator(program, result)`.
    #[serde(default)]
    pub evaluator_program: Option<String>,
    pub initial_program: String,
    pub initial_base_prompt: String,
    /// Overrides the configured generation count.
    #[serde(default)]
    pub generations: Option<usize>,
}

impl DiscoveryRequest {
    pub fn validate(&self) -> DaemonResult<()> {
        if self.initial_program.trim().is_empty() {
            return Err(DaemonError::InvalidRequest(
                "initial_program must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Where each run's evaluator comes from.
#[derive(Clone)]
enum EvaluatorSource {
    /// A subprocess evaluator bound to the request's evaluator source.
    Process(EvaluatorConfig),
    /// The same evaluator for every run.
    Fixed(Arc<dyn Evaluator>),
}

/// Builds and runs schedulers.
#[derive(Clone)]
pub struct DiscoveryEngine {
    oracle: Arc<dyn Oracle>,
    embedding: Arc<dyn EmbeddingSpace>,
    evaluator: EvaluatorSource,
    population: PopulationConfig,
    explorer: ExplorerConfig,
}

impl std::fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryEngine")
            .field("oracle", &self.oracle.name())
            .field("embedding", &self.embedding.name())
            .field("population", &self.population)
            .field("explorer", &self.explorer)
            .finish_non_exhaustive()
    }
}

impl DiscoveryEngine {
    pub fn from_config(config: &DaemonConfig) -> DaemonResult<Self> {
        config.population.validate()?;
        Ok(Self {
            oracle: config.oracle.build_oracle()?,
            embedding: config.oracle.build_embedding()?,
            evaluator: EvaluatorSource::Process(config.evaluator.clone()),
            population: config.population.clone(),
            explorer: config.explorer.clone(),
        })
    }

    /// Engine with explicit collaborators. The evaluator is used as is and
    /// any evaluator source in a request is ignored.
    pub fn new(
        oracle: Arc<dyn Oracle>,
        embedding: Arc<dyn EmbeddingSpace>,
        evaluator: Arc<dyn Evaluator>,
        population: PopulationConfig,
        explorer: ExplorerConfig,
    ) -> Self {
        Self {
            oracle,
            embedding,
            evaluator: EvaluatorSource::Fixed(evaluator),
            population,
            explorer,
        }
    }

    fn evaluator_for(&self, request: &DiscoveryRequest) -> DaemonResult<Arc<dyn Evaluator>> {
        match &self.evaluator {
            EvaluatorSource::Process(config) => {
                Ok(config.build_evaluator(request.evaluator_program.as_deref())?)
            }
            EvaluatorSource::Fixed(evaluator) => Ok(Arc::clone(evaluator)),
        }
    }

    /// Seed a fresh population with the request and run it to completion.
    pub async fn run(
        &self,
        request: &DiscoveryRequest,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> DaemonResult<RunReport> {
        request.validate()?;

        let mut explorer = self.explorer.clone();
        if let Some(generations) = request.generations {
            explorer.generations = generations;
        }

        let collaborators = Collaborators::new(
            Arc::clone(&self.oracle),
            self.evaluator_for(request)?,
            Arc::clone(&self.embedding),
        );
        let store = PopulationStore::new(self.population.clone())?;
        let mut scheduler = ExplorationScheduler::new(store, collaborators, explorer);
        if let Some(shutdown) = shutdown {
            scheduler = scheduler.with_shutdown(shutdown);
        }

        info!(
            generations = scheduler.config().generations,
            program_len = request.initial_program.len(),
            "starting discovery run"
        );
        scheduler
            .seed(&request.initial_program, &request.initial_base_prompt)
            .await?;
        Ok(scheduler.run().await?)
    }
}
