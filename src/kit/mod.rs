//! Drum kit: one-shot samples per voice and the player that fires them.
//!
//! Samples can come from WAV files or from the built-in synthesized voices.
//! Loading is meant to happen off the audio thread; the player only ever sees
//! finished `Sample`s, and a voice without one is simply silent.
//!
//! # Example
//!
//! ```ignore
//! use drumfield::kit::DrumKit;
//!
//! // WAVs where present, synthesized voices for the rest
//! let kit = DrumKit::load_dir("samples", 48_000);
//! ```

pub mod player;
pub mod synth;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sequencing::Voice;

pub use player::DrumPlayer;

#[derive(Debug, Error)]
pub enum KitError {
    #[error("failed to decode {path}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("{path} contains no audio")]
    EmptySample { path: PathBuf },
}

/// Mono one-shot audio
#[derive(Clone, PartialEq)]
pub struct Sample {
    frames: Vec<f32>,
    sample_rate: u32,
}

impl Sample {
    pub fn new(frames: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            frames,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Decode a WAV file, mixing all channels down to mono
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self, KitError> {
        let path = path.as_ref();
        let wav_err = |source| KitError::Wav {
            path: path.to_path_buf(),
            source,
        };

        let reader = hound::WavReader::open(path).map_err(wav_err)?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(wav_err)?,
            hound::SampleFormat::Int => {
                // Full-scale integer -> [-1, 1]
                let scale = 1.0 / (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(wav_err)?
            }
        };

        let frames: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        if frames.is_empty() {
            return Err(KitError::EmptySample {
                path: path.to_path_buf(),
            });
        }

        Ok(Self::new(frames, spec.sample_rate))
    }

    /// Linearly resample to `target_rate`
    pub fn resampled(&self, target_rate: u32) -> Sample {
        let target_rate = target_rate.max(1);
        if target_rate == self.sample_rate || self.frames.is_empty() {
            return Sample::new(self.frames.clone(), target_rate);
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = ((self.frames.len() as f64) / ratio).round().max(1.0) as usize;
        let last = self.frames.len() - 1;

        let frames = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = (pos.floor() as usize).min(last);
                let next = (idx + 1).min(last);
                let frac = (pos - idx as f64) as f32;
                self.frames[idx] + (self.frames[next] - self.frames[idx]) * frac
            })
            .collect();

        Sample::new(frames, target_rate)
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}

impl fmt::Debug for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sample")
            .field("frames", &self.frames.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// A full set of samples, one slot per voice
#[derive(Debug, Clone, Default)]
pub struct DrumKit {
    samples: [Option<Sample>; Voice::COUNT],
}

impl DrumKit {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in synthesized voices
    pub fn synthesized(sample_rate: u32) -> Self {
        let mut kit = Self::empty();
        for voice in Voice::ALL {
            kit.insert(voice, synth::render(voice, sample_rate));
        }
        kit
    }

    /// Load `<voice>.wav` for every voice from `dir`, resampled to `sample_rate`
    ///
    /// Voices whose file is missing or unreadable fall back to the synthesized
    /// sound; the failure is logged, not returned.
    pub fn load_dir(dir: impl AsRef<Path>, sample_rate: u32) -> Self {
        let dir = dir.as_ref();
        let mut kit = Self::empty();

        for voice in Voice::ALL {
            let path = dir.join(voice.file_name());
            let sample = match Sample::from_wav(&path) {
                Ok(sample) => {
                    tracing::info!(%voice, path = %path.display(), seconds = sample.duration(), "loaded sample");
                    sample.resampled(sample_rate)
                }
                Err(err) => {
                    tracing::warn!(%voice, error = %err, "falling back to synthesized voice");
                    synth::render(voice, sample_rate)
                }
            };
            kit.insert(voice, sample);
        }

        kit
    }

    pub fn insert(&mut self, voice: Voice, sample: Sample) {
        self.samples[voice.index()] = Some(sample);
    }

    pub fn get(&self, voice: Voice) -> Option<&Sample> {
        self.samples[voice.index()].as_ref()
    }

    /// Hand out every loaded sample
    pub fn into_samples(self) -> impl Iterator<Item = (Voice, Sample)> {
        Voice::ALL
            .into_iter()
            .zip(self.samples)
            .filter_map(|(voice, sample)| sample.map(|sample| (voice, sample)))
    }
}
