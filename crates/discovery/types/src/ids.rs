//! Identifiers for population records.
//!
//! Candidate and inspiration ids are assigned by the population store from
//! independent counters starting at 1. Niche ids are allocated in order as the
//! niche budget fills up.

use serde::{Deserialize, Serialize};

// ── Candidate ───────────────────────────────────────────────────────

/// Identifier of an evaluated candidate program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl CandidateId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "candidate:{}", self.0)
    }
}

// ── Inspiration ─────────────────────────────────────────────────────

/// Identifier of an improvement hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InspirationId(pub u64);

impl InspirationId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InspirationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inspiration:{}", self.0)
    }
}

// ── Niche ───────────────────────────────────────────────────────────

/// Partition key grouping candidates from the same embedding neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NicheId(pub u32);

impl NicheId {
    /// The niche allocated when `existing` distinct niches are already present.
    /// `None` once the id space is exhausted.
    pub fn next_after(existing: usize) -> Option<Self> {
        u32::try_from(existing).ok()?.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for NicheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "niche-{}", self.0)
    }
}
