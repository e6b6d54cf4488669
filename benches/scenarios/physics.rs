//! Benchmarks for one particle field step.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use drumfield::particles::{ParticleField, PointerState};

const PARTICLE_COUNTS: &[usize] = &[25, 50, 100];
const FRAME: f32 = 1.0 / 60.0;

pub fn bench_physics(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/physics");

    for &count in PARTICLE_COUNTS {
        // Pairwise repulsion (pointer up)
        let mut field = ParticleField::seeded(1280.0, 720.0, Some(count), 7);
        let idle = PointerState::default();
        group.bench_with_input(BenchmarkId::new("repel", count), &count, |b, _| {
            b.iter(|| field.step(black_box(FRAME), black_box(&idle)))
        });

        // Attraction to a held pointer
        let mut field = ParticleField::seeded(1280.0, 720.0, Some(count), 7);
        let mut held = PointerState::default();
        held.press(640.0, 360.0);
        group.bench_with_input(BenchmarkId::new("attract", count), &count, |b, _| {
            b.iter(|| field.step(black_box(FRAME), black_box(&held)))
        });

        let mut field = ParticleField::seeded(1280.0, 720.0, Some(count), 7);
        group.bench_with_input(BenchmarkId::new("teleport", count), &count, |b, _| {
            b.iter(|| field.teleport())
        });
    }

    group.finish();
}
