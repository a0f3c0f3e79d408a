//! End-to-end test: two generations with one pending inspiration per round.
//!
//! Each generation must add exactly one candidate and at least one new
//! inspiration, and the consumed inspiration must name the new child.

use std::sync::Arc;

use discovery_explorer::{lock_store, Collaborators, ExplorationScheduler, ExplorerConfig};
use discovery_oracle::{FnEvaluator, HashedEmbedding, SimulatedOracle};
use discovery_population::{PopulationConfig, PopulationStore};

fn scheduler(seed: u64) -> ExplorationScheduler {
    let store = PopulationStore::new(
        PopulationConfig::default()
            .with_mutation_rate(0.0)
            .with_seed(seed),
    )
    .unwrap();
    let collaborators = Collaborators::new(
        Arc::new(SimulatedOracle::new()),
        Arc::new(FnEvaluator::line_count()),
        Arc::new(HashedEmbedding::default()),
    );
    ExplorationScheduler::new(store, collaborators, ExplorerConfig::default().with_generations(2))
}

#[tokio::test]
async fn each_generation_adds_one_child() {
    let scheduler = scheduler(42);
    scheduler.seed("result = 1", "make result larger").await.unwrap();
    let store = scheduler.store();

    for generation in 1..=2 {
        let (before_candidates, before_hints, pending) = {
            let s = lock_store(&store);
            (s.len(), s.inspirations().len(), s.pending_count())
        };
        assert!(pending >= 1);

        let report = scheduler.run_generation(generation).await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded(), 1);

        let s = lock_store(&store);
        assert_eq!(s.len(), before_candidates + 1);
        assert!(s.inspirations().len() > before_hints);

        let child_id = report.child_ids()[0];
        let consumed = s
            .inspiration(report.successes[0].inspiration_id)
            .unwrap();
        assert_eq!(consumed.consumed_by, Some(child_id));
        assert_eq!(consumed.parent_id, report.parent_id);
    }
}

#[tokio::test]
async fn run_returns_best_of_population() {
    let scheduler = scheduler(7);
    scheduler.seed("result = 1", "make result larger").await.unwrap();
    let report = scheduler.run().await.unwrap();

    assert_eq!(report.generations.len(), 2);
    assert_eq!(report.population_size, 3);

    let store = scheduler.store();
    let s = lock_store(&store);
    let top = s
        .candidates()
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score).then(a.id.cmp(&b.id)))
        .unwrap();
    assert_eq!(report.best.candidate_id, top.id);
    assert_eq!(report.best.program, top.program);
}

#[tokio::test]
async fn seeds_open_niches_until_capacity() {
    let scheduler = scheduler(1);
    scheduler.seed("def alpha(): return 10\nresult = alpha()", "g").await.unwrap();
    scheduler.seed("class Matrix: pass\nresult = 2", "g").await.unwrap();

    let store = scheduler.store();
    let s = lock_store(&store);
    assert_eq!(s.niche_count(), 2);
    assert_ne!(s.candidates()[0].niche, s.candidates()[1].niche);
}
