//! Distribution checks for the generated operation mix.
//!
//! These run without a database: they only exercise the generator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use storeload_bench::{
    CatalogConfig, OpKind, OrderConfig, Population, PopulationConfig, RetailWorkload,
};

fn workload() -> RetailWorkload {
    let population = Population::new(
        &PopulationConfig::default(),
        &CatalogConfig::default(),
        &OrderConfig::default(),
    )
    .unwrap();
    RetailWorkload::new(population)
}

#[test]
fn empirical_mix_tracks_the_weight_table() {
    let workload = workload();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let total = 200_000u64;
    let mut counts = [0u64; OpKind::COUNT];
    for _ in 0..total {
        counts[workload.generate(&mut rng).kind().index()] += 1;
    }

    // Weights, in OpKind::ALL order.
    let expected = [0.03, 0.02, 0.10, 0.65, 0.05, 0.10, 0.05];

    for (i, kind) in OpKind::ALL.iter().enumerate() {
        let actual = counts[i] as f64 / total as f64;
        assert!(
            (actual - expected[i]).abs() < 0.01,
            "{} drifted: got {:.4}, want {:.4}",
            kind.label(),
            actual,
            expected[i]
        );
        assert!(counts[i] > 0, "{} never generated", kind.label());
    }
}

#[test]
fn same_seed_replays_the_same_kind_sequence() {
    let first: Vec<OpKind> = {
        let workload = workload();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        (0..500).map(|_| workload.generate(&mut rng).kind()).collect()
    };

    let second: Vec<OpKind> = {
        let workload = workload();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        (0..500).map(|_| workload.generate(&mut rng).kind()).collect()
    };

    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge() {
    let workload = workload();

    let mut rng_a = ChaCha8Rng::seed_from_u64(1);
    let a: Vec<OpKind> = (0..500).map(|_| workload.generate(&mut rng_a).kind()).collect();

    let mut rng_b = ChaCha8Rng::seed_from_u64(2);
    let b: Vec<OpKind> = (0..500).map(|_| workload.generate(&mut rng_b).kind()).collect();

    assert_ne!(a, b);
}
