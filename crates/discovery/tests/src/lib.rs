//! Cross-crate tests for the discovery engine.
//!
//! - `tests/property/`: proptest invariants of the population store
//! - `tests/e2e/`: scheduler and HTTP scenarios with offline collaborators
