//! Transport - musical-time scheduler
//!
//! Runs on the audio thread and turns a sample clock into sixteenth-note and
//! bar events. Every event carries the exact sample time it is due at, so
//! anything scheduled from it (drum triggers, bar-synced visuals) lines up with
//! the audio regardless of when the host callback actually ran.
//!
//! The sample clock keeps running while the transport is paused, the way an
//! audio context's clock does; only the musical position stops.

use crate::sequencing::TimeSignature;

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;
pub const DEFAULT_BPM: f64 = 120.0;

/// Glide time used for interactive tempo changes
pub const BPM_RAMP_SECONDS: f64 = 0.1;

/// Something the transport wants the caller to act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// A sixteenth note starts at `time`
    Sixteenth {
        /// Sixteenths since `start`
        index: u64,
        /// Scheduled time in seconds on the sample clock
        time: f64,
        /// Frame within the block being advanced
        offset: usize,
    },
    /// A bar starts at `time` (fires alongside its first sixteenth)
    Bar { index: u64, time: f64, offset: usize },
}

/// Linear tempo glide
#[derive(Debug, Clone, Copy)]
struct Ramp {
    target: f64,
    per_sample: f64,
    remaining: u64,
}

pub struct Transport {
    sample_rate: f64,
    bpm: f64,
    ramp: Option<Ramp>,
    time_signature: TimeSignature,
    playing: bool,
    /// Samples elapsed since the transport was created
    sample_position: u64,
    /// Sample position the next sixteenth is due at
    next_sixteenth_at: f64,
    /// Sixteenths emitted since the last start
    sixteenths: u64,
}

impl Transport {
    pub fn new(sample_rate: f64, bpm: f64) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            bpm: clamp_bpm(bpm).unwrap_or(DEFAULT_BPM),
            ramp: None,
            time_signature: TimeSignature::FOUR_FOUR,
            playing: false,
            sample_position: 0,
            next_sixteenth_at: 0.0,
            sixteenths: 0,
        }
    }

    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = time_signature;
        self
    }

    /// Samples per sixteenth note at the current tempo
    fn samples_per_sixteenth(&self) -> f64 {
        // sixteenths per second = (bpm / 60) * 4
        let sixteenths_per_second = (self.bpm / 60.0) * 4.0;
        self.sample_rate / sixteenths_per_second
    }

    /// Start from the top: the first sixteenth is due on the next sample
    pub fn start(&mut self) {
        self.playing = true;
        self.sixteenths = 0;
        self.next_sixteenth_at = self.sample_position as f64;
    }

    /// Stop emitting events; the sample clock keeps running
    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Jump to a tempo immediately (cancels any glide)
    pub fn set_bpm(&mut self, bpm: f64) {
        if let Some(bpm) = clamp_bpm(bpm) {
            self.bpm = bpm;
            self.ramp = None;
        }
    }

    /// Glide linearly to `bpm` over `seconds`
    pub fn ramp_to(&mut self, bpm: f64, seconds: f64) {
        let Some(target) = clamp_bpm(bpm) else {
            return;
        };

        let samples = (seconds.max(0.0) * self.sample_rate).round() as u64;
        if samples == 0 {
            self.set_bpm(target);
            return;
        }

        self.ramp = Some(Ramp {
            target,
            per_sample: (target - self.bpm) / samples as f64,
            remaining: samples,
        });
    }

    /// Current (possibly mid-glide) tempo
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Tempo the transport is heading for
    pub fn target_bpm(&self) -> f64 {
        self.ramp.map_or(self.bpm, |ramp| ramp.target)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    /// Current time on the sample clock, in seconds
    pub fn time(&self) -> f64 {
        self.sample_position as f64 / self.sample_rate
    }

    /// Sixteenths emitted since the last start
    pub fn sixteenths(&self) -> u64 {
        self.sixteenths
    }

    /// Advance the clock by one block, reporting events as they fall due
    pub fn advance(&mut self, frames: usize, mut on_event: impl FnMut(TransportEvent)) {
        let per_bar = u64::from(self.time_signature.sixteenths_per_bar());

        for offset in 0..frames {
            if self.playing && self.sample_position as f64 >= self.next_sixteenth_at {
                let time = self.time();
                let index = self.sixteenths;

                on_event(TransportEvent::Sixteenth { index, time, offset });
                if index % per_bar == 0 {
                    on_event(TransportEvent::Bar {
                        index: index / per_bar,
                        time,
                        offset,
                    });
                }

                self.sixteenths += 1;
                self.next_sixteenth_at += self.samples_per_sixteenth();
            }

            self.advance_ramp();
            self.sample_position += 1;
        }
    }

    fn advance_ramp(&mut self) {
        if let Some(ramp) = &mut self.ramp {
            ramp.remaining -= 1;
            if ramp.remaining == 0 {
                self.bpm = ramp.target;
                self.ramp = None;
            } else {
                self.bpm += ramp.per_sample;
            }
        }
    }
}

fn clamp_bpm(bpm: f64) -> Option<f64> {
    bpm.is_finite().then(|| bpm.clamp(MIN_BPM, MAX_BPM))
}
