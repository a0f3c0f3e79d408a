//! Exploration scheduler for the discovery engine.
//!
//! A run is a sequence of generations. Each generation samples one parent
//! from the population, explores every pending inspiration of that parent
//! concurrently, and waits for all explorations before the next sample:
//!
//! ```text
//! sample ─▶ [refine ─▶ mutate ─▶ score ─▶ critique ─▶ embed ─▶ commit] × N ─▶ barrier
//! ```
//!
//! Failed explorations either abort the generation or are skipped, leaving
//! their inspiration pending for a later round. Cancellation and generation
//! timeouts abort in-flight tasks; a task's store writes happen in one
//! critical section after its last await, so aborted tasks write nothing.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod task;

// ── Re-exports ──────────────────────────────────────────────────────

pub use config::{ExplorerConfig, FailurePolicy};
pub use error::{ExplorerError, ExplorerResult};
pub use report::{ExplorationSuccess, GenerationReport, RunId, RunReport, TaskFailure};
pub use scheduler::ExplorationScheduler;
pub use task::{lock_store, Collaborators, SharedStore};
