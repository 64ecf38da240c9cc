use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pacbandit::{
    BernoulliArm, ExpGapElimination, MedianElimination, MedianHeap, MultiRoundEpsilonArm, Solver,
    make_bernoulli_bandit_with_gap,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn gap_bandit(num_arms: usize, min_gap: f64, seed: u64) -> Vec<BernoulliArm> {
    let mut rng = StdRng::seed_from_u64(seed);
    make_bernoulli_bandit_with_gap(num_arms, min_gap, &mut rng).unwrap()
}

fn bench_median_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_heap");

    for n in [100, 1_000, 10_000].iter() {
        let mut rng = StdRng::seed_from_u64(1);
        let values: Vec<f64> = (0..*n).map(|_| rng.random::<f64>()).collect();

        group.bench_with_input(BenchmarkId::new("push", n), &values, |b, values| {
            b.iter(|| {
                let mut heap = MedianHeap::with_capacity(values.len());
                for (id, &value) in values.iter().enumerate() {
                    heap.push(value, id);
                }
                black_box(heap.median())
            });
        });

        group.bench_with_input(BenchmarkId::new("upper_half", n), &values, |b, values| {
            let heap: MedianHeap = values.iter().copied().zip(0..).collect();
            b.iter(|| black_box(heap.upper_ids()));
        });
    }

    group.finish();
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");
    group.sample_size(10);

    for n_arms in [4, 16].iter() {
        let arms = gap_bandit(*n_arms, 0.3, 2);

        group.bench_with_input(BenchmarkId::new("median_elimination", n_arms), &arms, |b, arms| {
            let solver = MedianElimination::new(0.3, 0.1).unwrap();
            b.iter(|| black_box(solver.solve(arms).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("exp_gap", n_arms), &arms, |b, arms| {
            let solver = ExpGapElimination::new(0.3, 0.1).unwrap();
            b.iter(|| black_box(solver.solve(arms).unwrap()));
        });
    }

    group.finish();
}

fn bench_multi_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_round");
    group.sample_size(10);

    let arms = gap_bandit(16, 0.3, 3);
    for players in [1, 2, 4].iter() {
        group.bench_with_input(BenchmarkId::new("players", players), players, |b, &players| {
            let solver = MultiRoundEpsilonArm::new(players, 0.2, 0.1).unwrap();
            b.iter(|| black_box(solver.solve(&arms).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_median_heap, bench_sequential, bench_multi_round);
criterion_main!(benches);
