//! Generation and run reports.

use chrono::{DateTime, Utc};
use discovery_population::{NicheSummary, ParentSample};
use discovery_types::{BestCandidate, CandidateId, InspirationId, NicheId};
use serde::{Deserialize, Serialize};

/// Unique identifier for one scheduler run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run:{}", self.0)
    }
}

/// A committed exploration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExplorationSuccess {
    pub inspiration_id: InspirationId,
    pub child_id: CandidateId,
    pub child_score: f64,
    /// The child scored below its parent.
    pub regression: bool,
    pub parent_hints: usize,
    pub child_hints: usize,
}

/// An exploration that did not commit. Its inspiration stays pending.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Absent when the task died before reporting back.
    pub inspiration_id: Option<InspirationId>,
    pub message: String,
}

/// Summary of one generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub parent_id: CandidateId,
    pub parent_score: f64,
    pub sampled_niche: NicheId,
    pub parent_niche: NicheId,
    pub crossover: bool,
    pub attempted: usize,
    pub successes: Vec<ExplorationSuccess>,
    pub failures: Vec<TaskFailure>,
    pub elapsed_ms: u64,
}

impl GenerationReport {
    pub(crate) fn new(generation: usize, sample: &ParentSample) -> Self {
        Self {
            generation,
            parent_id: sample.parent.id,
            parent_score: sample.parent.score,
            sampled_niche: sample.sampled_niche,
            parent_niche: sample.parent.niche,
            crossover: sample.crossover,
            attempted: sample.pending.len(),
            successes: Vec::new(),
            failures: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.successes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn regressions(&self) -> usize {
        self.successes.iter().filter(|s| s.regression).count()
    }

    pub fn child_ids(&self) -> Vec<CandidateId> {
        self.successes.iter().map(|s| s.child_id).collect()
    }

    /// Best child score produced this generation.
    pub fn best_child_score(&self) -> Option<f64> {
        self.successes
            .iter()
            .map(|s| s.child_score)
            .max_by(|a, b| a.total_cmp(b))
    }
}

impl std::fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generation({}, parent={}, tasks={}/{}, failed={}, {}ms)",
            self.generation,
            self.parent_id,
            self.succeeded(),
            self.attempted,
            self.failed(),
            self.elapsed_ms,
        )
    }
}

/// Summary of a complete run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub generations: Vec<GenerationReport>,
    pub best: BestCandidate,
    pub population_size: usize,
    pub inspiration_count: usize,
    pub niche_count: usize,
    pub niches: Vec<NicheSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn total_succeeded(&self) -> usize {
        self.generations.iter().map(GenerationReport::succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.generations.iter().map(GenerationReport::failed).sum()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunReport({}, generations={}, population={}, niches={}, best={} score={})",
            self.run_id,
            self.generations.len(),
            self.population_size,
            self.niche_count,
            self.best.candidate_id,
            self.best.score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> GenerationReport {
        GenerationReport {
            generation: 2,
            parent_id: CandidateId(1),
            parent_score: 3.0,
            sampled_niche: NicheId(1),
            parent_niche: NicheId(1),
            crossover: false,
            attempted: 3,
            successes: vec![
                ExplorationSuccess {
                    inspiration_id: InspirationId(1),
                    child_id: CandidateId(4),
                    child_score: 2.0,
                    regression: true,
                    parent_hints: 1,
                    child_hints: 1,
                },
                ExplorationSuccess {
                    inspiration_id: InspirationId(2),
                    child_id: CandidateId(5),
                    child_score: 7.5,
                    regression: false,
                    parent_hints: 1,
                    child_hints: 2,
                },
            ],
            failures: vec![TaskFailure {
                inspiration_id: Some(InspirationId(3)),
                message: "oracle error".into(),
            }],
            elapsed_ms: 12,
        }
    }

    #[test]
    fn counts() {
        let r = report();
        assert_eq!(r.succeeded(), 2);
        assert_eq!(r.failed(), 1);
        assert_eq!(r.regressions(), 1);
        assert_eq!(r.child_ids(), vec![CandidateId(4), CandidateId(5)]);
        assert_eq!(r.best_child_score(), Some(7.5));
    }

    #[test]
    fn display() {
        let text = report().to_string();
        assert!(text.contains("Generation(2"));
        assert!(text.contains("tasks=2/3"));
    }

    #[test]
    fn run_id_display() {
        assert!(RunId::new().to_string().starts_with("run:"));
    }
}
