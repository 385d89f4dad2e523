// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Deformed Basis Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use magneto_core::basis::{summed, BasisField, DifferentiableBasisField};
use magneto_core::deform::{
    flux_preserving, flux_preserving_basis, pullback_basis, standard_pipeline,
};
use magneto_core::field::VectorField;
use magneto_core::sources::{harmonic_basis, ShieldingHarmonic};
use magneto_math::vector::Vec3;
use magneto_types::config::{DeformationConfig, StretchParams, TwistWarpParams};
use std::hint::black_box;

fn pipeline_config() -> DeformationConfig {
    DeformationConfig {
        stretching: StretchParams {
            amplitude: 0.15,
            tilt_coupling: 0.05,
            ..StretchParams::default()
        },
        twist_warp: TwistWarpParams {
            warp: 0.4,
            twist: 0.02,
            ..TwistWarpParams::default()
        },
        ..DeformationConfig::default()
    }
}

fn scales(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|k| (4.0 + 1.5 * k as f64, 9.0 + 2.0 * k as f64))
        .collect()
}

fn sample_points() -> Vec<Vec3> {
    (0..64)
        .map(|i| {
            let t = i as f64;
            Vec3::new(-2.0 - 0.4 * t, 6.0 * (0.3 * t).sin(), 4.0 * (0.2 * t).cos())
        })
        .collect()
}

/// One shared mapping per point versus one mapping per term.
fn bench_deformed_basis(c: &mut Criterion) {
    let pipeline = standard_pipeline(0.35, &pipeline_config()).unwrap();
    let points = sample_points();
    let mut group = c.benchmark_group("deformed_basis");

    for &n in &[4usize, 16, 64] {
        let basis = harmonic_basis(&scales(n)).unwrap();

        let shared = flux_preserving_basis(&basis, &pipeline);
        group.bench_with_input(BenchmarkId::new("shared_mapping", n), &n, |b, _| {
            b.iter(|| {
                for p in &points {
                    black_box(shared.expand(black_box(p)).unwrap());
                }
            })
        });

        let per_term: Vec<_> = scales(n)
            .into_iter()
            .map(|(p, r)| flux_preserving(ShieldingHarmonic::new(p, r).unwrap(), &pipeline))
            .collect();
        group.bench_with_input(BenchmarkId::new("mapping_per_term", n), &n, |b, _| {
            b.iter(|| {
                for p in &points {
                    for field in &per_term {
                        black_box(field.evaluate(black_box(p)).unwrap());
                    }
                }
            })
        });
    }
    group.finish();
}

fn bench_pullback_sum(c: &mut Criterion) {
    let pipeline = standard_pipeline(0.35, &pipeline_config()).unwrap();
    let basis = harmonic_basis(&scales(16)).unwrap();
    let field = summed(pullback_basis(&basis, &pipeline));
    let points = sample_points();
    c.bench_function("pullback_basis_sum_16", |b| {
        b.iter(|| {
            for p in &points {
                black_box(field.evaluate(black_box(p)).unwrap());
            }
        })
    });
}

fn bench_flux_preserving_differentials(c: &mut Criterion) {
    let pipeline = standard_pipeline(0.35, &pipeline_config()).unwrap();
    let basis = harmonic_basis(&scales(16)).unwrap();
    let field = flux_preserving_basis(&basis, &pipeline);
    let points = sample_points();
    c.bench_function("flux_preserving_basis_differentials_16", |b| {
        b.iter(|| {
            for p in &points {
                black_box(field.differentiate_expansion(black_box(p)).unwrap());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_deformed_basis,
    bench_pullback_sum,
    bench_flux_preserving_differentials
);
criterion_main!(benches);
