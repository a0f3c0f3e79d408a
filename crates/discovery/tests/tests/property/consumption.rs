//! Property tests: an inspiration is consumed at most once and never reassigned.

use std::collections::HashMap;

use discovery_population::{PopulationConfig, PopulationStore};
use discovery_types::{CandidateId, InspirationId, Outcome};
use proptest::prelude::*;

fn seeded_store(candidates: usize, hints: usize) -> PopulationStore {
    let mut store = PopulationStore::new(PopulationConfig::default().with_seed(1)).unwrap();
    for i in 0..candidates {
        let mut embedding = vec![0.2; 6];
        embedding[i % 6] = 1.0;
        store
            .insert(format!("p{}", i), Outcome::scored(i as f64), "g", embedding)
            .unwrap();
    }
    for h in 0..hints {
        let parent = CandidateId((h % candidates) as u64 + 1);
        store.add_inspiration(parent, format!("hint {}", h)).unwrap();
    }
    store
}

proptest! {
    /// The first successful mark wins; later marks change nothing.
    #[test]
    fn first_mark_wins(
        marks in prop::collection::vec((1u64..12, 1u64..10), 1..80),
    ) {
        let mut store = seeded_store(8, 10);
        let mut first: HashMap<InspirationId, CandidateId> = HashMap::new();

        for (inspiration, child) in marks {
            let inspiration = InspirationId(inspiration);
            let child = CandidateId(child);
            let applied = store.mark_consumed(inspiration, child);

            let valid = store.inspiration(inspiration).is_some() && store.candidate(child).is_some();
            let expected = valid && !first.contains_key(&inspiration);
            prop_assert_eq!(applied, expected);
            if applied {
                first.insert(inspiration, child);
            }
        }

        for inspiration in store.inspirations() {
            prop_assert_eq!(inspiration.consumed_by, first.get(&inspiration.id).copied());
        }
    }

    /// Consumed inspirations never appear as pending in a sample.
    #[test]
    fn consumed_hints_are_never_sampled(
        consumed in prop::collection::btree_set(1u64..=10, 0..10),
    ) {
        let mut store = seeded_store(1, 10);
        for id in &consumed {
            store.mark_consumed(InspirationId(*id), CandidateId(1));
        }
        let sample = store.sample_parent().unwrap();
        prop_assert!(sample.pending.iter().all(|i| !consumed.contains(&i.id.value())));
        prop_assert_eq!(sample.all_inspirations.len(), 10);
        prop_assert_eq!(sample.pending.len(), (10 - consumed.len()).min(5));
    }
}
