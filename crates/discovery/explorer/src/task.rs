//! A single exploration: one inspiration turned into one child.

use std::sync::{Arc, Mutex, MutexGuard};

use discovery_oracle::{EmbeddingSpace, Evaluator, Oracle, Regression};
use discovery_population::PopulationStore;
use discovery_types::{Candidate, Inspiration};
use tracing::debug;

use crate::error::ExplorerResult;
use crate::report::ExplorationSuccess;

/// The population as shared between concurrently running tasks.
pub type SharedStore = Arc<Mutex<PopulationStore>>;

/// Lock the store. Store operations never leave partial state behind, so a
/// poisoned lock is still safe to use.
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, PopulationStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The external services a task calls.
#[derive(Clone)]
pub struct Collaborators {
    pub oracle: Arc<dyn Oracle>,
    pub evaluator: Arc<dyn Evaluator>,
    pub embedding: Arc<dyn EmbeddingSpace>,
}

impl Collaborators {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        evaluator: Arc<dyn Evaluator>,
        embedding: Arc<dyn EmbeddingSpace>,
    ) -> Self {
        Self {
            oracle,
            evaluator,
            embedding,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("oracle", &self.oracle.name())
            .field("evaluator", &self.evaluator.name())
            .field("embedding", &self.embedding.name())
            .finish()
    }
}

/// Explore `inspiration` against `parent` and commit the result.
///
/// All external calls happen before the store is touched. The writes are
/// then applied in one critical section, child first, so a task cancelled at
/// any await leaves no trace in the store.
pub(crate) async fn explore(
    collaborators: Collaborators,
    store: SharedStore,
    parent: Arc<Candidate>,
    inspiration: Inspiration,
    existing_hints: Arc<Vec<String>>,
) -> ExplorerResult<ExplorationSuccess> {
    let oracle = &collaborators.oracle;

    let guidance = if inspiration.text.trim().is_empty() {
        parent.guidance_prompt.clone()
    } else {
        oracle
            .refine_guidance(&parent.guidance_prompt, &parent.program, &inspiration.text)
            .await?
    };

    let child_program = oracle.mutate(&parent.program, &guidance).await?;
    let outcome = collaborators.evaluator.score(&child_program).await?;
    let child_score = outcome.score();
    let regression = child_score < parent.score;

    let parent_hints = if regression {
        debug!(
            parent_id = %parent.id,
            inspiration_id = %inspiration.id,
            parent_score = parent.score,
            score = child_score,
            "child regressed"
        );
        let regression = Regression {
            parent_guidance: &parent.guidance_prompt,
            parent_program: &parent.program,
            parent_outcome: &parent.outcome,
            child_program: &child_program,
            child_outcome: &outcome,
        };
        oracle.critique_regression(&regression, &existing_hints).await?
    } else {
        oracle
            .critique_outcome(&guidance, &child_program, &outcome, &existing_hints)
            .await?
    };

    let mut seen = existing_hints.to_vec();
    seen.extend(parent_hints.iter().cloned());
    let child_hints = oracle
        .critique_outcome(&guidance, &child_program, &outcome, &seen)
        .await?;

    let embedding = collaborators.embedding.embed(&child_program).await?;

    let commit = lock_store(&store).commit_exploration(
        parent.id,
        inspiration.id,
        child_program,
        outcome,
        guidance,
        embedding,
        parent_hints,
        child_hints,
    )?;

    debug!(
        parent_id = %parent.id,
        inspiration_id = %inspiration.id,
        child_id = %commit.child.id,
        niche = %commit.child.niche,
        score = child_score,
        "exploration committed"
    );

    Ok(ExplorationSuccess {
        inspiration_id: inspiration.id,
        child_id: commit.child.id,
        child_score,
        regression,
        parent_hints: commit.parent_inspirations.len(),
        child_hints: commit.child_inspirations.len(),
    })
}
