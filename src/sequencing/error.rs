use thiserror::Error;

use super::{Voice, STEPS};

/// Errors raised by pattern editing and preset loading
///
/// None of these are fatal: the caller is expected to drop the request and keep
/// the current pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// Step index outside the loop
    #[error("step {step} is out of range (pattern has {} steps)", STEPS)]
    InvalidStep { step: usize },
    /// Voice name that is not part of the kit
    #[error("unknown voice '{0}' (expected kick, snare, open_hat or closed_hat)")]
    UnknownVoice(String),
    /// Preset row with the wrong number of steps
    #[error("preset '{preset}' has {len} steps for {voice}, expected {}", STEPS)]
    MalformedPreset { preset: String, voice: Voice, len: usize },
    /// Preset lookup by index or name that matched nothing
    #[error("no preset named '{0}'")]
    UnknownPreset(String),
}
