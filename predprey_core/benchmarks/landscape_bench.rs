use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use predprey_core::{Landscape, LandscapeSettings};

fn bench_landscape(c: &mut Criterion) {
    let mut group = c.benchmark_group("landscape");

    for size in [64usize, 128, 256, 512] {
        let settings = LandscapeSettings {
            seed: 42,
            land_proportion: 0.75,
            smoothing_passes: 2,
        };
        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            b.iter(|| Landscape::generate(size, size, &settings).unwrap())
        });
    }

    for passes in [0u32, 1, 2, 4, 8] {
        let settings = LandscapeSettings {
            seed: 42,
            land_proportion: 0.75,
            smoothing_passes: passes,
        };
        group.bench_with_input(
            BenchmarkId::new("smoothing", passes),
            &passes,
            |b, _passes| b.iter(|| Landscape::generate(256, 256, &settings).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(landscape_benches, bench_landscape);
criterion_main!(landscape_benches);
