//! Multipole evaluation benchmarks
//!
//! - Pointwise potential and gradient against expansion degree
//! - Flat-buffer evaluation, which decodes the parameters on every call
//! - Parallel batch gradients against point count

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use multipole::physics::field::{FieldModel, StaticMultipoleModel};
use multipole::physics::math::{Scalar, Vector};
use multipole::physics::multipole::{
    BoundaryCondition, CoefficientSet, ExpansionConfig, MultipoleExpansion, num_coefficients,
};
use multipole::physics::special::LegendreRecurrence;

fn random_expansion(lmax: usize, seed: u64) -> MultipoleExpansion {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = num_coefficients(lmax);
    let s_lm = (0..count).map(|_| rng.random_range(-1.0..1.0)).collect();
    let t_lm = (0..count).map(|_| rng.random_range(-1.0..1.0)).collect();
    let config = ExpansionConfig::new(1.0, lmax, BoundaryCondition::Exterior, 1.0, 1.0).unwrap();
    let coefficients = CoefficientSet::new(lmax, s_lm, t_lm).unwrap();
    MultipoleExpansion::new(config, coefficients, LegendreRecurrence).unwrap()
}

fn random_positions(count: usize, seed: u64) -> Vec<Vector> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vector::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            )
        })
        .collect()
}

fn bench_pointwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("pointwise");
    let position = Vector::new(1.5, -0.7, 2.2);

    for &lmax in &[0, 2, 4, 8, 16] {
        let model = random_expansion(lmax, 42);

        group.bench_with_input(BenchmarkId::new("potential", lmax), &lmax, |b, _| {
            b.iter(|| black_box(model.potential(black_box(position))));
        });

        group.bench_with_input(BenchmarkId::new("gradient", lmax), &lmax, |b, _| {
            b.iter(|| {
                let mut gradient = Vector::ZERO;
                model.gradient(black_box(position), &mut gradient);
                black_box(gradient);
            });
        });
    }

    group.finish();
}

fn bench_flat_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_buffer");
    let field = StaticMultipoleModel::<LegendreRecurrence>::default();
    let q = [1.5, -0.7, 2.2];

    for &lmax in &[2, 8] {
        let params: Vec<Scalar> = random_expansion(lmax, 7).to_parameters();

        group.bench_with_input(BenchmarkId::new("gradient", lmax), &lmax, |b, _| {
            b.iter(|| {
                let mut out = [0.0; 3];
                field
                    .gradient(0.0, black_box(&params), black_box(&q), &mut out)
                    .unwrap();
                black_box(out);
            });
        });
    }

    group.finish();
}

fn bench_batch_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_gradient");
    let model = random_expansion(6, 11);

    for &count in &[100, 1_000, 10_000, 100_000] {
        let positions = random_positions(count, 13);

        group.bench_with_input(BenchmarkId::new("points", count), &count, |b, _| {
            let mut out = vec![Vector::ZERO; count];
            b.iter(|| {
                model.evaluator().gradient_batch(black_box(&positions), &mut out);
                black_box(&out);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pointwise, bench_flat_buffer, bench_batch_gradient);
criterion_main!(benches);
