//! Performance measurement for symmetry ranking at varying candidate counts

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graftgrid::algorithm::selection::rank_candidates;
use graftgrid::math::distance::DistanceMetric;
use std::hint::black_box;

/// Measures ranking cost as the eligible set grows toward a full grid
fn bench_rank_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_candidates");
    let side = 64;

    for &count in &[64usize, 512, 2048, 4096] {
        let candidates: Vec<[usize; 2]> = (0..count)
            .map(|index| [index / side, index % side])
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let ranked = rank_candidates(
                    black_box(&candidates),
                    Some([3, 5]),
                    side,
                    DistanceMetric::Euclidean,
                );
                black_box(ranked);
            });
        });
    }

    group.finish();
}

/// Measures the first-placement fallback ordering over a full grid
fn bench_rank_candidates_fallback(c: &mut Criterion) {
    let side = 64;
    let candidates: Vec<[usize; 2]> = (0..side * side)
        .map(|index| [index / side, index % side])
        .collect();

    c.bench_function("rank_candidates_fallback", |b| {
        b.iter(|| {
            let ranked = rank_candidates(
                black_box(&candidates),
                None,
                side,
                DistanceMetric::Chebyshev,
            );
            black_box(ranked);
        });
    });
}

criterion_group!(
    benches,
    bench_rank_candidates,
    bench_rank_candidates_fallback
);
criterion_main!(benches);
