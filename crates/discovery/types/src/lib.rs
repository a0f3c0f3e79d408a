//! Core records for the discovery engine.
//!
//! The engine evolves a population of candidate programs. Every candidate
//! carries the outcome reported by the evaluator, the guidance prompt that
//! produced it, its embedding, and the niche it was filed under. Inspirations
//! are natural-language hints attached to a candidate and consumed at most
//! once by an exploration.
//!
//! Both record kinds are append-only: once created they are never removed, and
//! the only field that ever changes after creation is
//! [`Inspiration::consumed_by`], which moves from `None` to `Some` exactly once.

#![deny(unsafe_code)]

pub mod hints;
pub mod ids;
pub mod outcome;
pub mod records;

// ── Re-exports ──────────────────────────────────────────────────────

pub use hints::{dedupe_hints, normalize_hint};
pub use ids::{CandidateId, InspirationId, NicheId};
pub use outcome::{Outcome, FAILURE_SCORE};
pub use records::{BestCandidate, Candidate, Inspiration};
