//! Property tests: ids are unique and strictly increasing, and the store only grows.

use std::sync::{Arc, Mutex};

use discovery_population::{PopulationConfig, PopulationStore};
use discovery_types::{CandidateId, InspirationId, Outcome};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    Insert { axis: usize, score: i32 },
    AddInspiration { parent: usize },
    Mark { inspiration: usize, child: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, -5i32..50).prop_map(|(axis, score)| Op::Insert { axis, score }),
        any::<usize>().prop_map(|parent| Op::AddInspiration { parent }),
        (any::<usize>(), any::<usize>()).prop_map(|(inspiration, child)| Op::Mark { inspiration, child }),
    ]
}

fn embedding(axis: usize) -> Vec<f64> {
    let mut v = vec![0.1; 8];
    v[axis % 8] = 1.0;
    v
}

fn apply(store: &mut PopulationStore, op: &Op) {
    match *op {
        Op::Insert { axis, score } => {
            store
                .insert(
                    format!("result = {}", score),
                    Outcome::scored(f64::from(score)),
                    "guidance",
                    embedding(axis),
                )
                .unwrap();
        }
        Op::AddInspiration { parent } => {
            if store.is_empty() {
                return;
            }
            let parent = store.candidates()[parent % store.len()].id;
            store.add_inspiration(parent, format!("hint for {}", parent)).unwrap();
        }
        Op::Mark { inspiration, child } => {
            if store.inspirations().is_empty() {
                return;
            }
            let inspiration = store.inspirations()[inspiration % store.inspirations().len()].id;
            let child = store.candidates()[child % store.len()].id;
            store.mark_consumed(inspiration, child);
        }
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Any operation sequence yields strictly increasing ids in storage order.
    #[test]
    fn ids_strictly_increase(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut store = PopulationStore::new(PopulationConfig::default().with_seed(11)).unwrap();
        for op in &ops {
            apply(&mut store, op);
        }

        let candidate_ids: Vec<CandidateId> = store.candidates().iter().map(|c| c.id).collect();
        prop_assert!(candidate_ids.windows(2).all(|w| w[0] < w[1]));

        let inspiration_ids: Vec<InspirationId> = store.inspirations().iter().map(|i| i.id).collect();
        prop_assert!(inspiration_ids.windows(2).all(|w| w[0] < w[1]));
    }

    /// Population size and inspiration count never decrease.
    #[test]
    fn store_is_append_only(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut store = PopulationStore::new(PopulationConfig::default().with_seed(5)).unwrap();
        let mut candidates = 0;
        let mut inspirations = 0;
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.len() >= candidates);
            prop_assert!(store.inspirations().len() >= inspirations);
            candidates = store.len();
            inspirations = store.inspirations().len();
        }
    }

    /// Every inspiration names a candidate that existed when it was created.
    #[test]
    fn inspiration_parents_exist(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut store = PopulationStore::new(PopulationConfig::default().with_seed(9)).unwrap();
        for op in &ops {
            apply(&mut store, op);
        }
        for inspiration in store.inspirations() {
            prop_assert!(store.candidate(inspiration.parent_id).is_some());
        }
    }
}

// ---------------------------------------------------------------------------
// Concurrent writers
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_keep_ids_unique_and_ordered() {
    let store = Arc::new(Mutex::new(
        PopulationStore::new(PopulationConfig::default().with_seed(3)).unwrap(),
    ));

    let mut handles = Vec::new();
    for task in 0..8usize {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for i in 0..10usize {
                {
                    let mut guard = store.lock().unwrap();
                    let candidate = guard
                        .insert(format!("t{}-{}", task, i), Outcome::scored(i as f64), "g", embedding(task + i))
                        .unwrap();
                    guard.add_inspiration(candidate.id, "next").unwrap();
                    drop(guard);
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let store = store.lock().unwrap();
    assert_eq!(store.len(), 80);
    assert_eq!(store.inspirations().len(), 80);
    assert!(store.candidates().windows(2).all(|w| w[0].id < w[1].id));
    assert!(store.inspirations().windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(store.candidates().last().unwrap().id, CandidateId(80));
}
