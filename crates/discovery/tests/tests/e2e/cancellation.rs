//! End-to-end test: cancelling a run never leaves dangling records.

use std::sync::Arc;
use std::time::Duration;

use discovery_explorer::{lock_store, Collaborators, ExplorationScheduler, ExplorerConfig, ExplorerError};
use discovery_oracle::{FnEvaluator, HashedEmbedding, SimulatedOracle};
use discovery_population::{PopulationConfig, PopulationStore};
use tokio::sync::watch;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_run_leaves_consistent_store() {
    let store = PopulationStore::new(
        PopulationConfig::default()
            .with_seed(12)
            .with_max_inspirations(5),
    )
    .unwrap();
    let collaborators = Collaborators::new(
        Arc::new(
            SimulatedOracle::new()
                .with_hints_per_critique(3)
                .with_latency(Duration::from_millis(15)),
        ),
        Arc::new(FnEvaluator::line_count()),
        Arc::new(HashedEmbedding::default()),
    );
    let (tx, rx) = watch::channel(false);
    let scheduler = ExplorationScheduler::new(
        store,
        collaborators,
        ExplorerConfig::default().with_generations(1_000),
    )
    .with_shutdown(rx);
    scheduler.seed("result = 1", "grow").await.unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        let _ = tx.send(true);
    });

    let err = scheduler.run().await.unwrap_err();
    assert!(matches!(err, ExplorerError::Cancelled { .. }));

    let store = scheduler.store();
    let s = lock_store(&store);
    assert!(s.len() >= 1);

    // Every consumption names an existing child.
    for inspiration in s.inspirations() {
        if let Some(child) = inspiration.consumed_by {
            assert!(s.candidate(child).is_some());
        }
    }

    // Every child was produced by exactly one consumed inspiration and
    // received its own hints in the same commit.
    for child in s.candidates().iter().skip(1) {
        let producers = s
            .inspirations()
            .iter()
            .filter(|i| i.consumed_by == Some(child.id))
            .count();
        assert_eq!(producers, 1);
        assert!(s.inspirations_for(child.id).count() >= 1);
    }
}
