//! Performance measurement for complete sampler runs at varying grid sizes

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graftgrid::io::settings::RunSettings;
use std::hint::black_box;

/// Measures a full run from settings to validated report
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(20);

    for &side in &[7usize, 15, 25] {
        let settings = RunSettings {
            side,
            blue_ratio: Some(0.3),
            ..RunSettings::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let Ok(setup) = settings.build() else {
                    return;
                };
                let Ok(sampler) = setup.into_sampler() else {
                    return;
                };
                let Ok(report) = sampler.run() else {
                    return;
                };
                black_box(report);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_run);
criterion_main!(benches);
