//! Benchmarks for lattice point generation, dual bases and cell sampling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_explorer::{
    utils::*, CoefficientEnumerator, DualBasisCalculator, EngineParams, LatticeConfig,
    LatticeEngine, SamplingMode,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("Coefficient Enumeration");

    for &(d, limit) in [(3usize, 10u32), (6, 3), (12, 1)].iter() {
        group.bench_with_input(
            BenchmarkId::new("full", format!("d{}_L{}", d, limit)),
            &(d, limit),
            |b, &(d, limit)| {
                b.iter(|| black_box(CoefficientEnumerator::new(black_box(d), limit).count()));
            },
        );
    }

    group.finish();
}

fn bench_point_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Point Generation");
    let engine = LatticeEngine::with_params(EngineParams::with_point_budget(50_000)).unwrap();

    for size in [3, 10, 100, 400].iter() {
        group.bench_with_input(BenchmarkId::new("capped", size), size, |b, &size| {
            let basis = well_conditioned_basis(size, Some(42)).unwrap();
            let config = LatticeConfig::from_basis(basis, 10).unwrap();

            b.iter(|| black_box(engine.generate_points(black_box(&config)).unwrap()));
        });
    }

    group.finish();
}

fn bench_dual_basis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dual Basis");
    group.sample_size(10);
    let calculator = DualBasisCalculator::new();

    for size in [10, 50, 100, 400].iter() {
        group.bench_with_input(BenchmarkId::new("gauss_jordan", size), size, |b, &size| {
            let basis = well_conditioned_basis(size, Some(42)).unwrap();

            b.iter(|| black_box(calculator.compute(black_box(&basis)).unwrap()));
        });
    }

    group.finish();
}

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parallelepiped Sampler");
    let engine = LatticeEngine::new();

    for size in [4, 12, 20].iter() {
        group.bench_with_input(BenchmarkId::new("corners", size), size, |b, &size| {
            let config = LatticeConfig::new(size).unwrap();
            let mode = SamplingMode::Corners { offset: None };
            let mut rng = StdRng::seed_from_u64(7);

            b.iter(|| black_box(engine.sample_parallelepiped(&config, &mode, &mut rng).unwrap()));
        });
    }

    group.bench_function("interior_d400", |b| {
        let config = LatticeConfig::new(400).unwrap();
        let mode = SamplingMode::RandomInterior { offset: None };
        let mut rng = StdRng::seed_from_u64(7);

        b.iter(|| black_box(engine.sample_parallelepiped(&config, &mode, &mut rng).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_enumeration,
    bench_point_generation,
    bench_dual_basis,
    bench_sampler
);
criterion_main!(benches);
