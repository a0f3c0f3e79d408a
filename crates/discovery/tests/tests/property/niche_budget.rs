//! Property tests: niche allocation honours the budget and sampling honours elites.

use std::collections::HashSet;

use discovery_population::{PopulationConfig, PopulationStore};
use discovery_types::{CandidateId, Outcome};
use proptest::prelude::*;

fn basis(dim: usize, i: usize) -> Vec<f64> {
    let mut v = vec![0.0; dim];
    v[i] = 1.0;
    v
}

proptest! {
    /// k dissimilar candidates open min(k, capacity) niches.
    #[test]
    fn niche_count_is_capped(k in 1usize..16, capacity in 1usize..10) {
        let mut store = PopulationStore::new(
            PopulationConfig::default().with_niche_capacity(capacity).with_seed(2),
        )
        .unwrap();
        for i in 0..k {
            store.insert(format!("p{}", i), Outcome::scored(1.0), "g", basis(16, i)).unwrap();
            prop_assert!(store.niche_count() <= capacity);
        }
        prop_assert_eq!(store.niche_count(), k.min(capacity));
    }

    /// A parent is always one of the top `elite_count` members of its niche.
    #[test]
    fn sampled_parent_is_an_elite(
        scores in prop::collection::vec(-10i32..100, 1..20),
        elite_count in 1usize..6,
        seed in any::<u64>(),
    ) {
        let mut store = PopulationStore::new(
            PopulationConfig::default()
                .with_niche_capacity(1)
                .with_elite_count(elite_count)
                .with_seed(seed),
        )
        .unwrap();
        for (i, score) in scores.iter().enumerate() {
            store
                .insert(format!("p{}", i), Outcome::scored(f64::from(*score)), "g", vec![1.0, i as f64])
                .unwrap();
        }

        let mut ranked: Vec<(i32, CandidateId)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (*s, CandidateId(i as u64 + 1)))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let elites: HashSet<CandidateId> = ranked.iter().take(elite_count).map(|(_, id)| *id).collect();

        for _ in 0..10 {
            let sample = store.sample_parent().unwrap();
            prop_assert!(elites.contains(&sample.parent.id));
        }
    }

    /// With mutation rate 1 and several niches, the parent never comes from
    /// the niche drawn first.
    #[test]
    fn full_mutation_always_crosses(niches in 2usize..6, seed in any::<u64>()) {
        let mut store = PopulationStore::new(
            PopulationConfig::default()
                .with_niche_capacity(niches)
                .with_mutation_rate(1.0)
                .with_seed(seed),
        )
        .unwrap();
        for i in 0..niches {
            store.insert(format!("p{}", i), Outcome::scored(1.0), "g", basis(8, i)).unwrap();
        }
        for _ in 0..5 {
            let sample = store.sample_parent().unwrap();
            prop_assert!(sample.crossover);
            prop_assert_ne!(sample.parent.niche, sample.sampled_niche);
        }
    }
}
