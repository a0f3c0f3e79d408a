//! Niche-partitioned population for the discovery engine.
//!
//! The store keeps every evaluated candidate and every improvement hint.
//! Candidates are partitioned into niches by embedding similarity; parents are
//! drawn from the elites of a random niche, occasionally swapped for an elite
//! of a different niche to keep the search from settling on one region.
//!
//! # Invariants
//!
//! - Candidate and inspiration ids are unique and strictly increasing.
//! - Nothing is ever removed.
//! - An inspiration's consumer is set at most once.
//! - The number of niches never exceeds the configured capacity.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod niche;
pub mod store;

// ── Re-exports ──────────────────────────────────────────────────────

pub use config::PopulationConfig;
pub use error::{PopulationError, PopulationResult};
pub use niche::{assign, cosine_similarity, NicheAssignment};
pub use store::{ExplorationCommit, NicheMember, NicheSummary, ParentSample, PopulationStore};
