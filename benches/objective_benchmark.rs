//! Benchmarks for objective evaluation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rmaxent::core::Objective;
use rmaxent::dataset::IndexedExamples;
use rmaxent::objective::LogConditionalObjective;
use rmaxent::prior::QuadraticPrior;

const NUM_EXAMPLES: usize = 500;
const NUM_FEATURES: usize = 200;
const NUM_CLASSES: usize = 5;
const FEATURES_PER_EXAMPLE: usize = 12;

/// Deterministic pseudo-random stream, good enough for benchmark shapes
fn lcg(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *state >> 33
}

fn synthetic_data() -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut state = 0x5eed_u64;
    let data = (0..NUM_EXAMPLES)
        .map(|_| {
            (0..FEATURES_PER_EXAMPLE)
                .map(|_| (lcg(&mut state) as usize) % NUM_FEATURES)
                .collect()
        })
        .collect();
    let labels = (0..NUM_EXAMPLES)
        .map(|_| (lcg(&mut state) as usize) % NUM_CLASSES)
        .collect();
    (data, labels)
}

fn bench_objective_evaluation(c: &mut Criterion) {
    let (data, labels) = synthetic_data();
    let examples =
        IndexedExamples::new(NUM_FEATURES, NUM_CLASSES, &data, None, &labels, None).unwrap();
    let objective =
        LogConditionalObjective::new(examples, QuadraticPrior::new(1.0).unwrap()).unwrap();

    let mut state = 0xabcd_u64;
    let x: Vec<f64> = (0..objective.domain_dimension())
        .map(|_| (lcg(&mut state) % 1000) as f64 / 1000.0 - 0.5)
        .collect();

    c.bench_function("log_conditional_calculate", |b| {
        b.iter(|| objective.calculate(black_box(&x)).unwrap())
    });
}

criterion_group!(benches, bench_objective_evaluation);
criterion_main!(benches);
