//! Population records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CandidateId, InspirationId, NicheId};
use crate::outcome::Outcome;

// ── Candidate ───────────────────────────────────────────────────────

/// A generated program together with its evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// The artifact under evolution.
    pub program: String,
    /// Fitness extracted from `outcome` at insertion time.
    pub score: f64,
    pub outcome: Outcome,
    /// Guidance in effect when this candidate was produced.
    pub guidance_prompt: String,
    pub embedding: Vec<f64>,
    pub niche: NicheId,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// Lexicographic `(score, id)` key used for best-of selection.
    pub fn rank_key(&self) -> (f64, CandidateId) {
        (self.score, self.id)
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, score={})", self.id, self.niche, self.score)
    }
}

// ── Inspiration ─────────────────────────────────────────────────────

/// An improvement hint about a specific parent candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inspiration {
    pub id: InspirationId,
    pub parent_id: CandidateId,
    pub text: String,
    /// Candidate produced by acting on this hint. Set once, never cleared.
    pub consumed_by: Option<CandidateId>,
    pub created_at: DateTime<Utc>,
}

impl Inspiration {
    pub fn is_pending(&self) -> bool {
        self.consumed_by.is_none()
    }
}

impl std::fmt::Display for Inspiration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.consumed_by {
            Some(child) => write!(f, "{} -> {} (consumed by {})", self.id, self.parent_id, child),
            None => write!(f, "{} -> {} (pending)", self.id, self.parent_id),
        }
    }
}

// ── Best-of ─────────────────────────────────────────────────────────

/// What a finished run reports back to its caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestCandidate {
    pub candidate_id: CandidateId,
    pub program: String,
    #[serde(rename = "base_prompt")]
    pub guidance_prompt: String,
    pub score: f64,
}

impl From<&Candidate> for BestCandidate {
    fn from(c: &Candidate) -> Self {
        Self {
            candidate_id: c.id,
            program: c.program.clone(),
            guidance_prompt: c.guidance_prompt.clone(),
            score: c.score,
        }
    }
}
