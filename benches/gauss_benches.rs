use RustedGauss::Examples::gauss_examples::{diagonally_dominant_system, gauss_examples};
use RustedGauss::somelinalg::gauss_elimination::{GaussElimination, PivotStrategy};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::DMatrix;
use std::hint::black_box;

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gauss elimination");
    for n in [10, 50, 200] {
        let Ab = diagonally_dominant_system(n);
        for strategy in [PivotStrategy::ZeroAvoidance, PivotStrategy::Partial] {
            let solver = GaussElimination::new().with_pivoting(strategy);
            group.bench_with_input(BenchmarkId::new(strategy.to_string(), n), &Ab, |b, Ab| {
                b.iter(|| solver.solve(black_box(Ab)))
            });
        }
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let systems: Vec<DMatrix<f64>> = (1..=100).map(diagonally_dominant_system).collect();
    let solver = GaussElimination::new();
    c.bench_function("batch of 100 systems", |b| {
        b.iter(|| solver.solve_many(black_box(&systems)))
    });
}

fn bench_example_4(c: &mut Criterion) {
    c.bench_function("Gauss example 4", |b| b.iter(|| gauss_examples(4)));
}

criterion_group!(benches, bench_strategies, bench_batch, bench_example_4);
criterion_main!(benches);
