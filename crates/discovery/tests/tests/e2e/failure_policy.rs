//! End-to-end test: skip and abort failure policies over full runs.

use std::sync::Arc;

use discovery_explorer::{
    lock_store, Collaborators, ExplorationScheduler, ExplorerConfig, ExplorerError, FailurePolicy,
};
use discovery_oracle::{FailingOracle, FnEvaluator, HashedEmbedding, Oracle, SimulatedOracle};
use discovery_population::{PopulationConfig, PopulationStore};

fn scheduler(oracle: Arc<dyn Oracle>, config: ExplorerConfig) -> ExplorationScheduler {
    let store = PopulationStore::new(PopulationConfig::default().with_seed(4)).unwrap();
    let collaborators = Collaborators::new(
        oracle,
        Arc::new(FnEvaluator::line_count()),
        Arc::new(HashedEmbedding::default()),
    );
    ExplorationScheduler::new(store, collaborators, config)
}

#[tokio::test]
async fn skip_policy_retries_in_later_generations() {
    let scheduler = scheduler(
        Arc::new(FailingOracle),
        ExplorerConfig::default()
            .with_generations(3)
            .with_failure_policy(FailurePolicy::Skip),
    );
    let seed = scheduler.seed("result = 1", "grow").await.unwrap();

    let report = scheduler.run().await.unwrap();
    assert_eq!(report.total_failed(), 3);
    assert_eq!(report.best.candidate_id, seed.id);

    // The same inspiration is offered again every generation.
    let retried: Vec<_> = report
        .generations
        .iter()
        .map(|g| g.failures[0].inspiration_id)
        .collect();
    assert!(retried.windows(2).all(|w| w[0] == w[1]));

    let store = scheduler.store();
    assert_eq!(lock_store(&store).pending_count(), 1);
}

#[tokio::test]
async fn abort_policy_stops_the_run_and_keeps_commits() {
    let scheduler = scheduler(
        Arc::new(SimulatedOracle::new().with_failure_marker("poison")),
        ExplorerConfig::default()
            .with_generations(5)
            .with_failure_policy(FailurePolicy::Abort),
    );
    let seed = scheduler.seed("result = 1", "grow").await.unwrap();

    // One good generation first.
    let first = scheduler.run_generation(1).await.unwrap();
    assert_eq!(first.succeeded(), 1);

    {
        let store = scheduler.store();
        let mut s = lock_store(&store);
        let ids: Vec<_> = s.candidates().iter().map(|c| c.id).collect();
        for id in ids {
            s.add_inspiration(id, "poison").unwrap();
        }
    }

    let err = scheduler.run().await.unwrap_err();
    assert!(matches!(err, ExplorerError::GenerationAborted { failed, .. } if failed >= 1));

    let store = scheduler.store();
    let s = lock_store(&store);
    assert!(s.len() >= 2);
    assert!(s.candidate(seed.id).is_some());
    for hint in s.inspirations().iter().filter(|i| i.text == "poison") {
        assert!(hint.is_pending());
    }
}
