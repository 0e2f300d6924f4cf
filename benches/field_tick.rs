//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use netfield::prelude::*;
use netfield::{find_connections, Connections};

fn population(count: usize) -> Vec<Particle> {
    let mut rng = SmallRng::seed_from_u64(7);
    let config = FieldConfig::default();
    let size = Vec2::new(1280.0, 720.0);
    (0..count).map(|_| Particle::spawn(&mut rng, &config, size)).collect()
}

fn bench_connections(c: &mut Criterion) {
    let mut group = c.benchmark_group("connections");

    for count in [80, 200, 500] {
        let particles = population(count);

        group.bench_with_input(BenchmarkId::new("iterate", count), &particles, |b, p| {
            b.iter(|| black_box(Connections::new(p, 150.0, 0.5).count()))
        });

        group.bench_with_input(BenchmarkId::new("collect", count), &particles, |b, p| {
            b.iter(|| black_box(find_connections(p, 150.0, 0.5)))
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [80, 200] {
        let config = FieldConfig::default().with_particle_count(count);

        group.bench_function(BenchmarkId::new("recording", count), |b| {
            let mut field = ParticleField::with_seed(RecordingSurface::new(1280.0, 720.0), config.clone(), 1).unwrap();
            field.set_pointer(Some(Vec2::new(640.0, 360.0)));
            b.iter(|| {
                field.tick();
                black_box(field.context_mut().take());
            })
        });

        group.bench_function(BenchmarkId::new("raster", count), |b| {
            let mut field = ParticleField::with_seed(RasterSurface::new(1280, 720), config.clone(), 1).unwrap();
            field.set_pointer(Some(Vec2::new(640.0, 360.0)));
            b.iter(|| {
                field.tick();
                black_box(field.frame());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_connections, bench_tick);
criterion_main!(benches);
