//! Synthesized drum one-shots.
//!
//! Used when no WAV is available for a voice. Each voice is rendered once into
//! a `Sample`, so playback costs the same as a recorded kit.
//!
//! # How They Are Built
//!
//! - Kick: sine body with a fast pitch drop (~150Hz to 50Hz) and a short decay
//! - Snare: pitched body plus a high-passed noise burst
//! - Closed hat: very short, high-passed noise
//! - Open hat: the same noise, left to ring
//!
//! Noise is seeded per voice so a kit renders identically every time.

use std::f32::consts::TAU;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::Sample;
use crate::sequencing::Voice;

/// Render the synthesized one-shot for `voice`
pub fn render(voice: Voice, sample_rate: u32) -> Sample {
    let sample_rate = sample_rate.max(1);
    let sr = sample_rate as f32;
    let (frames, level) = match voice {
        Voice::Kick => (kick(sr), 0.9),
        Voice::Snare => (snare(sr), 0.8),
        Voice::OpenHat => (hat(voice, sr, 0.5, 0.15), 0.45),
        Voice::ClosedHat => (hat(voice, sr, 0.08, 0.02), 0.5),
    };
    Sample::new(normalize(frames, level), sample_rate)
}

/// Scale so the loudest frame sits at `level`
fn normalize(mut frames: Vec<f32>, level: f32) -> Vec<f32> {
    let peak = frames.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    if peak > 0.0 {
        let gain = level / peak;
        frames.iter_mut().for_each(|x| *x *= gain);
    }
    frames
}

fn frame_count(sample_rate: f32, seconds: f32) -> usize {
    (sample_rate * seconds).ceil() as usize
}

fn noise_source(voice: Voice) -> SmallRng {
    SmallRng::seed_from_u64(0x5eed_0000 + voice.index() as u64)
}

/// Exponential decay with a 1ms linear attack to avoid a click
fn decay(t: f32, time_constant: f32) -> f32 {
    let attack = (t / 0.001).min(1.0);
    attack * (-t / time_constant).exp()
}

fn kick(sample_rate: f32) -> Vec<f32> {
    let mut phase = 0.0f32;
    (0..frame_count(sample_rate, 0.35))
        .map(|n| {
            let t = n as f32 / sample_rate;
            // Pitch envelope: starts ~150Hz, settles at 50Hz
            let freq = 50.0 + 100.0 * (-t / 0.03).exp();
            phase = (phase + freq / sample_rate).fract();
            (phase * TAU).sin() * decay(t, 0.12)
        })
        .collect()
}

fn snare(sample_rate: f32) -> Vec<f32> {
    let mut rng = noise_source(Voice::Snare);
    let mut filter = HighPass::new(1500.0, sample_rate);
    (0..frame_count(sample_rate, 0.25))
        .map(|n| {
            let t = n as f32 / sample_rate;
            let body = (t * 185.0 * TAU).sin() * decay(t, 0.05) * 0.5;
            let noise = filter.process(rng.gen_range(-1.0..1.0)) * decay(t, 0.08) * 0.6;
            body + noise
        })
        .collect()
}

fn hat(voice: Voice, sample_rate: f32, seconds: f32, time_constant: f32) -> Vec<f32> {
    let mut rng = noise_source(voice);
    let mut filter = HighPass::new(7000.0, sample_rate);
    (0..frame_count(sample_rate, seconds))
        .map(|n| {
            let t = n as f32 / sample_rate;
            filter.process(rng.gen_range(-1.0..1.0)) * decay(t, time_constant)
        })
        .collect()
}

/// One-pole high-pass filter
struct HighPass {
    alpha: f32,
    prev_in: f32,
    prev_out: f32,
}

impl HighPass {
    fn new(cutoff: f32, sample_rate: f32) -> Self {
        let rc = 1.0 / (TAU * cutoff);
        let dt = 1.0 / sample_rate;
        Self {
            alpha: rc / (rc + dt),
            prev_in: 0.0,
            prev_out: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let out = self.alpha * (self.prev_out + input - self.prev_in);
        self.prev_in = input;
        self.prev_out = out;
        out
    }
}
