//! The population store.
//!
//! Owns every evaluated candidate and every inspiration. All operations are
//! synchronous; callers sharing a store across tasks wrap it in a mutex so
//! that inserts, inspiration writes and consumption marks are serialized and
//! ids stay strictly increasing.

use std::collections::BTreeMap;

use chrono::Utc;
use discovery_types::{
    BestCandidate, Candidate, CandidateId, Inspiration, InspirationId, NicheId, Outcome,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PopulationConfig;
use crate::error::{PopulationError, PopulationResult};
use crate::niche::{self, NicheAssignment};

// ── Sampling result ─────────────────────────────────────────────────

/// A parent drawn for one generation, plus the hints to explore from it.
#[derive(Clone, Debug)]
pub struct ParentSample {
    pub parent: Candidate,
    /// Unconsumed hints for `parent`, oldest first, capped per round.
    pub pending: Vec<Inspiration>,
    /// Every hint ever attached to `parent`, consumed or not.
    pub all_inspirations: Vec<Inspiration>,
    /// Niche picked before any crossover.
    pub sampled_niche: NicheId,
    /// Whether the parent came from a different niche than `sampled_niche`.
    pub crossover: bool,
}

impl ParentSample {
    /// Texts of all hints on the parent, used as "do not repeat" context.
    pub fn existing_hints(&self) -> Vec<String> {
        self.all_inspirations
            .iter()
            .map(|i| i.text.clone())
            .collect()
    }
}

/// Everything written by a single committed exploration.
#[derive(Clone, Debug)]
pub struct ExplorationCommit {
    pub child: Candidate,
    /// False when the inspiration had already been consumed.
    pub consumed: bool,
    pub parent_inspirations: Vec<Inspiration>,
    pub child_inspirations: Vec<Inspiration>,
}

/// Candidates grouped under one niche, best first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NicheSummary {
    pub niche: NicheId,
    pub members: Vec<NicheMember>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NicheMember {
    pub id: CandidateId,
    pub score: f64,
}

impl NicheSummary {
    pub fn best_score(&self) -> Option<f64> {
        self.members.first().map(|m| m.score)
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Append-only population of candidates and inspirations.
pub struct PopulationStore {
    config: PopulationConfig,
    candidates: Vec<Candidate>,
    inspirations: Vec<Inspiration>,
    next_candidate_id: u64,
    next_inspiration_id: u64,
    rng: StdRng,
}

impl std::fmt::Debug for PopulationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopulationStore")
            .field("config", &self.config)
            .field("candidates", &self.candidates.len())
            .field("inspirations", &self.inspirations.len())
            .finish()
    }
}

impl PopulationStore {
    /// Create an empty store. Seeds the RNG from `config.seed` when present.
    pub fn new(config: PopulationConfig) -> PopulationResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create an empty store driven by an explicit random source.
    pub fn with_rng(config: PopulationConfig, rng: StdRng) -> PopulationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            candidates: Vec::new(),
            inspirations: Vec::new(),
            next_candidate_id: 1,
            next_inspiration_id: 1,
            rng,
        })
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Evaluate the niche for `embedding` and append a new candidate.
    pub fn insert(
        &mut self,
        program: impl Into<String>,
        outcome: Outcome,
        guidance_prompt: impl Into<String>,
        embedding: Vec<f64>,
    ) -> PopulationResult<Candidate> {
        let assignment = niche::assign(&embedding, &self.candidates, self.config.niche_capacity)?;

        let candidate = Candidate {
            id: CandidateId(self.next_candidate_id),
            program: program.into(),
            score: outcome.score(),
            outcome,
            guidance_prompt: guidance_prompt.into(),
            embedding,
            niche: assignment.niche(),
            created_at: Utc::now(),
        };

        match &assignment {
            NicheAssignment::Allocated(niche) => {
                info!(candidate = %candidate.id, %niche, "opened new niche");
            }
            NicheAssignment::Nearest {
                niche,
                neighbour,
                similarity,
            } => {
                debug!(
                    candidate = %candidate.id,
                    %niche,
                    %neighbour,
                    similarity,
                    "joined nearest niche"
                );
            }
        }

        self.next_candidate_id += 1;
        self.candidates.push(candidate.clone());
        Ok(candidate)
    }

    /// Attach a new, unconsumed hint to `parent_id`.
    pub fn add_inspiration(
        &mut self,
        parent_id: CandidateId,
        text: impl Into<String>,
    ) -> PopulationResult<Inspiration> {
        if self.candidate(parent_id).is_none() {
            return Err(PopulationError::UnknownCandidate(parent_id));
        }

        let inspiration = Inspiration {
            id: InspirationId(self.next_inspiration_id),
            parent_id,
            text: text.into(),
            consumed_by: None,
            created_at: Utc::now(),
        };
        self.next_inspiration_id += 1;
        self.inspirations.push(inspiration.clone());
        Ok(inspiration)
    }

    /// Record that `inspiration_id` produced `child_id`.
    ///
    /// Returns whether the mark was applied. Already-consumed or unknown
    /// inspirations are left untouched, as are marks naming a candidate that
    /// does not exist.
    pub fn mark_consumed(&mut self, inspiration_id: InspirationId, child_id: CandidateId) -> bool {
        if self.candidate(child_id).is_none() {
            warn!(inspiration = %inspiration_id, child = %child_id, "consumption names unknown candidate");
            return false;
        }

        match self
            .inspirations
            .iter_mut()
            .find(|i| i.id == inspiration_id && i.consumed_by.is_none())
        {
            Some(inspiration) => {
                inspiration.consumed_by = Some(child_id);
                true
            }
            None => {
                debug!(inspiration = %inspiration_id, "inspiration already consumed or unknown");
                false
            }
        }
    }

    /// Apply the writes of one finished exploration as a single unit:
    /// insert the child, mark the inspiration consumed, then attach hints to
    /// the parent and the child.
    ///
    /// Nothing is written if any precondition fails.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_exploration(
        &mut self,
        parent_id: CandidateId,
        inspiration_id: InspirationId,
        program: impl Into<String>,
        outcome: Outcome,
        guidance_prompt: impl Into<String>,
        embedding: Vec<f64>,
        parent_hints: Vec<String>,
        child_hints: Vec<String>,
    ) -> PopulationResult<ExplorationCommit> {
        if self.candidate(parent_id).is_none() {
            return Err(PopulationError::UnknownCandidate(parent_id));
        }

        let child = self.insert(program, outcome, guidance_prompt, embedding)?;
        let consumed = self.mark_consumed(inspiration_id, child.id);

        let mut parent_inspirations = Vec::with_capacity(parent_hints.len());
        for hint in parent_hints {
            parent_inspirations.push(self.add_inspiration(parent_id, hint)?);
        }
        let mut child_inspirations = Vec::with_capacity(child_hints.len());
        for hint in child_hints {
            child_inspirations.push(self.add_inspiration(child.id, hint)?);
        }

        Ok(ExplorationCommit {
            child,
            consumed,
            parent_inspirations,
            child_inspirations,
        })
    }

    // ── Sampling ────────────────────────────────────────────────────

    /// Draw a parent elite and its pending hints.
    ///
    /// A niche is picked uniformly, then an elite within it. With probability
    /// `mutation_rate` (and more than one niche present) the draw is replaced
    /// wholesale by one from a different, uniformly chosen niche.
    pub fn sample_parent(&mut self) -> PopulationResult<ParentSample> {
        let niches = self.niches();
        let sampled_niche = *niches
            .choose(&mut self.rng)
            .ok_or(PopulationError::EmptyPopulation)?;

        let mut parent = self.pick_elite(sampled_niche)?;
        let mut crossover = false;

        if niches.len() > 1 && self.rng.gen::<f64>() < self.config.mutation_rate {
            let others: Vec<NicheId> = niches
                .iter()
                .copied()
                .filter(|n| *n != sampled_niche)
                .collect();
            if let Some(&other) = others.choose(&mut self.rng) {
                info!(from = %sampled_niche, to = %other, "niche crossover");
                parent = self.pick_elite(other)?;
                crossover = true;
            }
        }

        let all_inspirations: Vec<Inspiration> = self.inspirations_for(parent.id).cloned().collect();
        let pending: Vec<Inspiration> = all_inspirations
            .iter()
            .filter(|i| i.is_pending())
            .take(self.config.max_inspirations_per_round)
            .cloned()
            .collect();

        Ok(ParentSample {
            parent,
            pending,
            all_inspirations,
            sampled_niche,
            crossover,
        })
    }

    /// Top `elite_count` candidates of `niche`, by score descending then id ascending.
    pub fn elites(&self, niche: NicheId) -> Vec<&Candidate> {
        let mut members: Vec<&Candidate> = self
            .candidates
            .iter()
            .filter(|c| c.niche == niche)
            .collect();
        members.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        members.truncate(self.config.elite_count);
        members
    }

    fn pick_elite(&mut self, niche: NicheId) -> PopulationResult<Candidate> {
        let elites: Vec<Candidate> = self.elites(niche).into_iter().cloned().collect();
        elites
            .choose(&mut self.rng)
            .cloned()
            .ok_or(PopulationError::EmptyPopulation)
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// The candidate maximizing `(score, id)`.
    pub fn best(&self) -> PopulationResult<BestCandidate> {
        self.candidates
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score).then(a.id.cmp(&b.id)))
            .map(BestCandidate::from)
            .ok_or(PopulationError::EmptyPopulation)
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn inspiration(&self, id: InspirationId) -> Option<&Inspiration> {
        self.inspirations.iter().find(|i| i.id == id)
    }

    /// All hints attached to `parent_id`, in creation order.
    pub fn inspirations_for(&self, parent_id: CandidateId) -> impl Iterator<Item = &Inspiration> {
        self.inspirations
            .iter()
            .filter(move |i| i.parent_id == parent_id)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn inspirations(&self) -> &[Inspiration] {
        &self.inspirations
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.inspirations.iter().filter(|i| i.is_pending()).count()
    }

    /// Distinct niches present, in ascending order.
    pub fn niches(&self) -> Vec<NicheId> {
        let mut niches: Vec<NicheId> = self.candidates.iter().map(|c| c.niche).collect();
        niches.sort();
        niches.dedup();
        niches
    }

    pub fn niche_count(&self) -> usize {
        self.niches().len()
    }

    /// Per-niche membership with scores, best first within each niche.
    pub fn niche_summary(&self) -> Vec<NicheSummary> {
        let mut grouped: BTreeMap<NicheId, Vec<NicheMember>> = BTreeMap::new();
        for c in &self.candidates {
            grouped.entry(c.niche).or_default().push(NicheMember {
                id: c.id,
                score: c.score,
            });
        }
        grouped
            .into_iter()
            .map(|(niche, mut members)| {
                members.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
                NicheSummary { niche, members }
            })
            .collect()
    }
}
