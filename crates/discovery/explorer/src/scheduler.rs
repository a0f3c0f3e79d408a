//! Generation loop.
//!
//! Each generation samples a parent, spawns one task per pending inspiration
//! and waits for all of them before the next sample is drawn.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use discovery_population::PopulationStore;
use discovery_types::{BestCandidate, Candidate, InspirationId};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{ExplorerConfig, FailurePolicy};
use crate::error::{ExplorerError, ExplorerResult};
use crate::report::{ExplorationSuccess, GenerationReport, RunId, RunReport, TaskFailure};
use crate::task::{explore, lock_store, Collaborators, SharedStore};

type TaskOutput = (InspirationId, ExplorerResult<ExplorationSuccess>);

/// Drives generations of exploration over a shared population.
pub struct ExplorationScheduler {
    store: SharedStore,
    collaborators: Collaborators,
    config: ExplorerConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for ExplorationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorationScheduler")
            .field("collaborators", &self.collaborators)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExplorationScheduler {
    pub fn new(store: PopulationStore, collaborators: Collaborators, config: ExplorerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            collaborators,
            config,
            shutdown: None,
        }
    }

    /// Cancel cooperatively once `true` is sent on this channel.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Handle to the underlying population.
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// Evaluate and insert the initial program, with one empty inspiration
    /// so the first generation has work to do.
    pub async fn seed(&self, program: &str, guidance: &str) -> ExplorerResult<Candidate> {
        let outcome = self.collaborators.evaluator.score(program).await?;
        let embedding = self.collaborators.embedding.embed(program).await?;

        let mut store = lock_store(&self.store);
        let candidate = store.insert(program, outcome, guidance, embedding)?;
        store.add_inspiration(candidate.id, "")?;

        info!(
            candidate = %candidate.id,
            niche = %candidate.niche,
            score = candidate.score,
            "seeded population"
        );
        Ok(candidate)
    }

    /// The best candidate found so far.
    pub fn best(&self) -> ExplorerResult<BestCandidate> {
        Ok(lock_store(&self.store).best()?)
    }

    /// Run the configured number of generations and report the best candidate.
    pub async fn run(&self) -> ExplorerResult<RunReport> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        info!(
            %run_id,
            generations = self.config.generations,
            oracle = self.collaborators.oracle.name(),
            evaluator = self.collaborators.evaluator.name(),
            "exploration started"
        );

        let mut generations = Vec::with_capacity(self.config.generations);
        for generation in 1..=self.config.generations {
            if self.shutdown_requested() {
                return Err(ExplorerError::Cancelled { generation });
            }
            let report = self.run_generation(generation).await?;
            info!(
                generation,
                parent_id = %report.parent_id,
                succeeded = report.succeeded(),
                failed = report.failed(),
                regressions = report.regressions(),
                elapsed_ms = report.elapsed_ms,
                "generation complete"
            );
            generations.push(report);
        }

        let store = lock_store(&self.store);
        let best = store.best()?;
        let niches = store.niche_summary();
        for summary in &niches {
            let members: Vec<String> = summary
                .members
                .iter()
                .map(|m| format!("{}={}", m.id, m.score))
                .collect();
            info!(niche = %summary.niche, members = ?members, "niche summary");
        }

        let report = RunReport {
            run_id,
            generations,
            best,
            population_size: store.len(),
            inspiration_count: store.inspirations().len(),
            niche_count: niches.len(),
            niches,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            run_id = %report.run_id,
            best = %report.best.candidate_id,
            score = report.best.score,
            population = report.population_size,
            "exploration finished"
        );
        Ok(report)
    }

    /// Sample, fan out, and wait for every task of one generation.
    pub async fn run_generation(&self, generation: usize) -> ExplorerResult<GenerationReport> {
        let started = Instant::now();
        let sample = lock_store(&self.store).sample_parent()?;
        let mut report = GenerationReport::new(generation, &sample);

        debug!(
            generation,
            parent_id = %sample.parent.id,
            niche = %sample.parent.niche,
            pending = sample.pending.len(),
            crossover = sample.crossover,
            "sampled parent"
        );

        if sample.pending.is_empty() {
            debug!(generation, parent_id = %sample.parent.id, "no pending inspirations");
            report.elapsed_ms = elapsed_ms(started);
            return Ok(report);
        }

        let existing_hints = Arc::new(sample.existing_hints());
        let parent = Arc::new(sample.parent);
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        for inspiration in sample.pending {
            let collaborators = self.collaborators.clone();
            let store = Arc::clone(&self.store);
            let parent = Arc::clone(&parent);
            let existing_hints = Arc::clone(&existing_hints);
            tasks.spawn(async move {
                let id = inspiration.id;
                let result = explore(collaborators, store, parent, inspiration, existing_hints).await;
                (id, result)
            });
        }

        match self.config.generation_timeout() {
            Some(limit) => {
                let joined =
                    tokio::time::timeout(limit, self.join_tasks(generation, &mut tasks, &mut report))
                        .await;
                match joined {
                    Ok(result) => result?,
                    Err(_) => {
                        drain(&mut tasks, &mut report).await;
                        warn!(
                            generation,
                            secs = limit.as_secs(),
                            succeeded = report.succeeded(),
                            "generation timed out"
                        );
                        return Err(ExplorerError::Timeout {
                            generation,
                            secs: limit.as_secs(),
                        });
                    }
                }
            }
            None => self.join_tasks(generation, &mut tasks, &mut report).await?,
        }

        report.elapsed_ms = elapsed_ms(started);
        Ok(report)
    }

    async fn join_tasks(
        &self,
        generation: usize,
        tasks: &mut JoinSet<TaskOutput>,
        report: &mut GenerationReport,
    ) -> ExplorerResult<()> {
        let mut shutdown = self.shutdown.clone();
        loop {
            let joined = match shutdown.as_mut() {
                Some(rx) => tokio::select! {
                    joined = tasks.join_next() => joined,
                    _ = wait_for_shutdown(rx) => {
                        drain(tasks, report).await;
                        info!(generation, succeeded = report.succeeded(), "exploration cancelled");
                        return Err(ExplorerError::Cancelled { generation });
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                return Ok(());
            };

            let (inspiration_id, error) = match joined {
                Ok((_, Ok(success))) => {
                    report.successes.push(success);
                    continue;
                }
                Ok((inspiration_id, Err(error))) => (Some(inspiration_id), error),
                Err(join_error) => {
                    warn!(generation, error = %join_error, "exploration task died");
                    report.failures.push(TaskFailure {
                        inspiration_id: None,
                        message: join_error.to_string(),
                    });
                    if self.config.failure_policy == FailurePolicy::Abort {
                        drain(tasks, report).await;
                        return Err(aborted(generation, report, join_error.to_string()));
                    }
                    continue;
                }
            };

            if error.is_fatal() {
                drain(tasks, report).await;
                return Err(error);
            }

            warn!(
                generation,
                inspiration_id = ?inspiration_id.map(|id| id.to_string()),
                error = %error,
                "exploration failed"
            );
            report.failures.push(TaskFailure {
                inspiration_id,
                message: error.to_string(),
            });

            if self.config.failure_policy == FailurePolicy::Abort {
                drain(tasks, report).await;
                return Err(aborted(generation, report, error.to_string()));
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

/// Abort the remaining tasks and wait for every one of them to stop.
///
/// A task blocked outside an await keeps running until it yields, and may
/// still commit; its result is recorded so the report matches the store.
async fn drain(tasks: &mut JoinSet<TaskOutput>, report: &mut GenerationReport) {
    tasks.abort_all();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(success))) => report.successes.push(success),
            Ok((inspiration_id, Err(error))) => report.failures.push(TaskFailure {
                inspiration_id: Some(inspiration_id),
                message: error.to_string(),
            }),
            Err(join_error) if join_error.is_cancelled() => {}
            Err(join_error) => report.failures.push(TaskFailure {
                inspiration_id: None,
                message: join_error.to_string(),
            }),
        }
    }
}

fn aborted(generation: usize, report: &GenerationReport, reason: String) -> ExplorerError {
    ExplorerError::GenerationAborted {
        generation,
        succeeded: report.succeeded(),
        failed: report.failed(),
        reason,
    }
}

/// Resolves once `true` is observed. Never resolves if the sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
