//! DrumPlayer - sample-accurate one-shot playback
//!
//! Triggers arrive with a scheduled time on the transport clock. The player
//! converts that time to a frame offset inside the block being rendered, so a
//! hit lands on the same sample no matter where in the callback it was
//! scheduled. Nothing here allocates after construction.

use super::Sample;
use crate::sequencing::{Trigger, Voice};

/// Simultaneous one-shots before the oldest is cut off
pub const MAX_PLAYHEADS: usize = 32;

#[derive(Debug, Clone, Copy)]
struct Playhead {
    voice: Voice,
    /// Frame into the sample; negative while waiting for the scheduled start
    position: isize,
}

pub struct DrumPlayer {
    sample_rate: f64,
    /// One slot per voice; `None` until the sample has finished loading
    samples: [Option<Sample>; Voice::COUNT],
    playheads: Vec<Playhead>,
    gain: f32,
}

impl DrumPlayer {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            samples: Default::default(),
            playheads: Vec::with_capacity(MAX_PLAYHEADS),
            gain: 0.8,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Make a voice playable, returning the sample it replaces
    ///
    /// The sample should already be at the player's sample rate.
    pub fn install(&mut self, voice: Voice, sample: Sample) -> Option<Sample> {
        self.samples[voice.index()].replace(sample)
    }

    pub fn is_loaded(&self, voice: Voice) -> bool {
        self.samples[voice.index()].is_some()
    }

    /// Loaded flag per voice, indexed by `Voice::index`
    pub fn loaded(&self) -> [bool; Voice::COUNT] {
        let mut loaded = [false; Voice::COUNT];
        for voice in Voice::ALL {
            loaded[voice.index()] = self.is_loaded(voice);
        }
        loaded
    }

    /// Queue a trigger for the block starting at `block_start` (seconds)
    ///
    /// Returns `false` when the voice has no sample yet; that is not an error,
    /// the hit is just dropped.
    pub fn schedule(&mut self, trigger: Trigger, block_start: f64) -> bool {
        if !self.is_loaded(trigger.voice) {
            return false;
        }

        // Late triggers start right away rather than being dropped
        let offset = ((trigger.time - block_start) * self.sample_rate).round().max(0.0) as isize;

        if self.playheads.len() == MAX_PLAYHEADS {
            self.playheads.remove(0);
        }
        self.playheads.push(Playhead {
            voice: trigger.voice,
            position: -offset,
        });
        true
    }

    /// Mix every active one-shot into `out`
    pub fn render(&mut self, out: &mut [f32]) {
        let Self {
            samples,
            playheads,
            gain,
            ..
        } = self;

        for playhead in playheads.iter_mut() {
            let Some(sample) = samples[playhead.voice.index()].as_ref() else {
                continue;
            };
            let frames = sample.frames();

            for out_sample in out.iter_mut() {
                if playhead.position >= 0 {
                    match frames.get(playhead.position as usize) {
                        Some(&s) => *out_sample += s * *gain,
                        None => break,
                    }
                }
                playhead.position += 1;
            }
        }

        playheads.retain(|playhead| {
            samples[playhead.voice.index()]
                .as_ref()
                .is_some_and(|sample| playhead.position < sample.len() as isize)
        });
    }

    /// One-shots currently sounding or waiting to start
    pub fn active_voices(&self) -> usize {
        self.playheads.len()
    }

    /// Cut every one-shot immediately
    pub fn silence(&mut self) {
        self.playheads.clear();
    }
}
