use criterion::{black_box, criterion_group, criterion_main, Criterion};
use synonymy_cluster::coherence::{evaluate_stimulus, CoherenceConfig, ScoreScaling};
use synonymy_cluster::cut::{cophenetic_correlation, cut};
use synonymy_cluster::distance::DistanceVector;
use synonymy_cluster::labels::{pair_count, LabelSet};
use synonymy_cluster::linkage::average_linkage;

fn random_f64(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

fn distances(n: usize) -> DistanceVector {
    DistanceVector::from_similarity(&random_f64(pair_count(n), 42), n).unwrap()
}

fn bench_linkage(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_linkage");

    for n in [20, 100, 300] {
        let dv = distances(n);
        group.bench_function(format!("{}_labels", n), |b| {
            b.iter(|| average_linkage(black_box(&dv)))
        });
    }

    group.finish();
}

fn bench_cut(c: &mut Criterion) {
    let mut group = c.benchmark_group("cut");

    let dv = distances(300);
    let linkage = average_linkage(&dv).unwrap();
    group.bench_function("300_labels", |b| b.iter(|| cut(black_box(&linkage), 0.5)));
    group.bench_function("300_labels_cophenetic", |b| {
        b.iter(|| cophenetic_correlation(black_box(&linkage), black_box(&dv)))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_stimulus");

    let n = 50;
    let labels = LabelSet::new((0..n).map(|i| format!("label{}", i))).unwrap();
    let scores = random_f64(pair_count(n), 7);
    for scaling in [ScoreScaling::MinMax, ScoreScaling::Identity] {
        let config = CoherenceConfig {
            scaling,
            ..CoherenceConfig::default()
        };
        group.bench_function(format!("50_labels_{:?}", scaling), |b| {
            b.iter(|| evaluate_stimulus("bench", &labels, black_box(&scores), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_linkage, bench_cut, bench_pipeline);
criterion_main!(benches);
