//! Niche assignment.
//!
//! While fewer than `capacity` distinct niches exist, every new candidate
//! opens a niche of its own. Once the budget is spent, a candidate joins the
//! niche of its single most similar existing candidate (cosine similarity,
//! ties going to the earliest stored candidate).
//!
//! The assignment is greedy and depends on insertion order. Niches are fixed
//! once assigned and are never recomputed.

use std::collections::BTreeSet;

use discovery_types::{Candidate, CandidateId, NicheId};

use crate::error::{PopulationError, PopulationResult};

/// How a niche was chosen for a new embedding.
#[derive(Clone, Debug, PartialEq)]
pub enum NicheAssignment {
    /// The niche budget was not yet full; a fresh niche was opened.
    Allocated(NicheId),
    /// Joined the niche of the most similar existing candidate.
    Nearest {
        niche: NicheId,
        neighbour: CandidateId,
        similarity: f64,
    },
}

impl NicheAssignment {
    pub fn niche(&self) -> NicheId {
        match self {
            Self::Allocated(niche) => *niche,
            Self::Nearest { niche, .. } => *niche,
        }
    }

    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::Allocated(_))
    }
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Fails on zero-norm input or on vectors of different length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> PopulationResult<f64> {
    if a.len() != b.len() {
        return Err(PopulationError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(PopulationError::DegenerateVector(
            "zero-norm vector in cosine similarity".into(),
        ));
    }

    Ok(dot / (norm_a * norm_b))
}

/// Number of distinct niches among `population`.
pub fn distinct_niches(population: &[Candidate]) -> usize {
    population
        .iter()
        .map(|c| c.niche)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Decide which niche `embedding` belongs to.
pub fn assign(
    embedding: &[f64],
    population: &[Candidate],
    capacity: usize,
) -> PopulationResult<NicheAssignment> {
    let observed = distinct_niches(population);
    if observed < capacity {
        let niche = NicheId::next_after(observed).ok_or_else(|| {
            PopulationError::InvalidConfig(format!("no niche id left after {} niches", observed))
        })?;
        return Ok(NicheAssignment::Allocated(niche));
    }

    let mut best: Option<(f64, &Candidate)> = None;
    for candidate in population {
        let similarity = cosine_similarity(embedding, &candidate.embedding)?;
        // Strictly greater keeps the first-encountered candidate on ties.
        if best.map_or(true, |(top, _)| similarity > top) {
            best = Some((similarity, candidate));
        }
    }

    best.map(|(similarity, candidate)| NicheAssignment::Nearest {
        niche: candidate.niche,
        neighbour: candidate.id,
        similarity,
    })
    .ok_or(PopulationError::EmptyPopulation)
}
