//! End-to-end test: hints from a regressed child are attached to the parent.

use std::sync::Arc;

use discovery_explorer::{lock_store, Collaborators, ExplorationScheduler, ExplorerConfig};
use discovery_oracle::{FnEvaluator, HashedEmbedding, SimulatedOracle};
use discovery_population::{PopulationConfig, PopulationStore};
use discovery_types::Outcome;

fn scheduler(evaluator: FnEvaluator, hints_per_critique: usize) -> ExplorationScheduler {
    let store = PopulationStore::new(
        PopulationConfig::default()
            .with_mutation_rate(0.0)
            .with_seed(9),
    )
    .unwrap();
    let collaborators = Collaborators::new(
        Arc::new(SimulatedOracle::new().with_hints_per_critique(hints_per_critique)),
        Arc::new(evaluator),
        Arc::new(HashedEmbedding::default()),
    );
    ExplorationScheduler::new(store, collaborators, ExplorerConfig::default())
}

#[tokio::test]
async fn regression_hints_attach_to_parent_only() {
    // Every mutation makes the program worse.
    let evaluator = FnEvaluator::new(|program| {
        Outcome::scored(100.0 - program.lines().count() as f64)
    });
    let scheduler = scheduler(evaluator, 2);
    let seed = scheduler.seed("result = 1", "shrink").await.unwrap();

    let report = scheduler.run_generation(1).await.unwrap();
    assert_eq!(report.regressions(), 1);
    let child_id = report.child_ids()[0];

    let store = scheduler.store();
    let s = lock_store(&store);
    let regression_hints: Vec<_> = s
        .inspirations()
        .iter()
        .filter(|i| i.text.starts_with("regression"))
        .collect();
    assert_eq!(regression_hints.len(), 2);
    assert!(regression_hints.iter().all(|i| i.parent_id == seed.id));

    let child_hints: Vec<_> = s.inspirations_for(child_id).collect();
    assert_eq!(child_hints.len(), 2);
    assert!(child_hints.iter().all(|i| i.text.starts_with("refine")));
}

#[tokio::test]
async fn improvement_critiques_outcome_for_parent() {
    let scheduler = scheduler(FnEvaluator::line_count(), 1);
    let seed = scheduler.seed("result = 1", "grow").await.unwrap();

    let report = scheduler.run_generation(1).await.unwrap();
    assert_eq!(report.regressions(), 0);

    let store = scheduler.store();
    let s = lock_store(&store);
    let parent_hints: Vec<_> = s
        .inspirations_for(seed.id)
        .filter(|i| !i.text.is_empty())
        .collect();
    assert_eq!(parent_hints.len(), 1);
    assert!(parent_hints[0].text.starts_with("refine"));
    assert!(s.inspirations().iter().all(|i| !i.text.starts_with("regression")));
}

#[tokio::test]
async fn failed_evaluation_is_a_regression_not_an_error() {
    let evaluator = FnEvaluator::new(|program| {
        if program.contains("# applied") {
            Outcome::failure("NameError: name 'x' is not defined")
        } else {
            Outcome::scored(3.0)
        }
    });
    let scheduler = scheduler(evaluator, 1);
    scheduler.seed("result = 3", "grow").await.unwrap();

    let report = scheduler.run_generation(1).await.unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.regressions(), 1);
    assert_eq!(report.successes[0].child_score, -1.0);

    let store = scheduler.store();
    let s = lock_store(&store);
    let child = s.candidate(report.child_ids()[0]).unwrap();
    assert!(child.outcome.is_failure());
}
