//! Benchmarks for rendering engine blocks while the pattern plays.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use drumfield::{
    engine::{Command, Engine},
    kit::DrumKit,
    sequencing::{Voice, STEPS},
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: u32 = 48_000;

fn playing_engine(bpm: f64) -> Engine {
    let mut engine = Engine::builder(SAMPLE_RATE as f64)
        .bpm(bpm)
        .build()
        .expect("built-in preset");
    for (voice, sample) in DrumKit::synthesized(SAMPLE_RATE).into_samples() {
        engine.handle(Command::InstallSample { voice, sample }).unwrap();
    }
    engine.handle(Command::Start).unwrap();
    engine
}

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === PRESET ===
        // groove_one at a normal tempo
        let mut groove = playing_engine(120.0);
        group.bench_with_input(BenchmarkId::new("groove_one", size), &size, |b, _| {
            b.iter(|| groove.process_block(black_box(&mut buffer)))
        });

        // === DENSE ===
        // Every cell on at the fastest tempo, so the playhead pool stays full
        let mut dense = playing_engine(300.0);
        dense.handle(Command::Clear).unwrap();
        for voice in Voice::ALL {
            for step in 0..STEPS {
                dense.handle(Command::Toggle { voice, step }).unwrap();
            }
        }
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |b, _| {
            b.iter(|| dense.process_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}
