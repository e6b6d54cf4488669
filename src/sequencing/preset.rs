/*
Presets
=======

A preset is a named assignment of all four voices. It is plain data: it can
come from the built-in library or from a JSON file, so nothing stops a preset
from carrying a row of the wrong length. Validation happens when a preset is
turned into a grid (which is what `PatternStore::load` does); a malformed row is
rejected, never truncated or padded.

JSON shape (rows accept 0/1 or booleans):

    { "name": "dance",
      "kick":       [1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0],
      "snare":      [0,0,0,0,1,0,0,0,0,0,0,0,1,0,0,0],
      "open_hat":   [0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0],
      "closed_hat": [0,0,0,0,0,0,0,1,0,0,0,0,0,0,0,1] }
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Grid, SequencerError, Voice, STEPS};

/// A named pattern for all four voices
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(with = "step_bits"))]
    pub kick: Vec<bool>,
    #[cfg_attr(feature = "serde", serde(with = "step_bits"))]
    pub snare: Vec<bool>,
    #[cfg_attr(feature = "serde", serde(with = "step_bits"))]
    pub open_hat: Vec<bool>,
    #[cfg_attr(feature = "serde", serde(with = "step_bits"))]
    pub closed_hat: Vec<bool>,
}

impl Preset {
    /// Create a silent preset (every row 16 steps, all off)
    pub fn silent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kick: vec![false; STEPS],
            snare: vec![false; STEPS],
            open_hat: vec![false; STEPS],
            closed_hat: vec![false; STEPS],
        }
    }

    /// Build a preset from 0/1 rows, the way patterns are usually written down
    pub fn from_bits(
        name: impl Into<String>,
        kick: [u8; STEPS],
        snare: [u8; STEPS],
        open_hat: [u8; STEPS],
        closed_hat: [u8; STEPS],
    ) -> Self {
        let bits = |row: [u8; STEPS]| row.iter().map(|&b| b != 0).collect::<Vec<_>>();
        Self {
            name: name.into(),
            kick: bits(kick),
            snare: bits(snare),
            open_hat: bits(open_hat),
            closed_hat: bits(closed_hat),
        }
    }

    pub fn row(&self, voice: Voice) -> &[bool] {
        match voice {
            Voice::Kick => &self.kick,
            Voice::Snare => &self.snare,
            Voice::OpenHat => &self.open_hat,
            Voice::ClosedHat => &self.closed_hat,
        }
    }

    pub fn row_mut(&mut self, voice: Voice) -> &mut Vec<bool> {
        match voice {
            Voice::Kick => &mut self.kick,
            Voice::Snare => &mut self.snare,
            Voice::OpenHat => &mut self.open_hat,
            Voice::ClosedHat => &mut self.closed_hat,
        }
    }

    /// Check that every row has exactly `STEPS` entries
    pub fn validate(&self) -> Result<(), SequencerError> {
        for voice in Voice::ALL {
            let len = self.row(voice).len();
            if len != STEPS {
                return Err(SequencerError::MalformedPreset {
                    preset: self.name.clone(),
                    voice,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Copy the rows into a fixed-size grid, validating first
    pub fn to_grid(&self) -> Result<Grid, SequencerError> {
        self.validate()?;

        let mut grid = [[false; STEPS]; Voice::COUNT];
        for voice in Voice::ALL {
            grid[voice.index()].copy_from_slice(self.row(voice));
        }
        Ok(grid)
    }
}

#[cfg(feature = "serde")]
mod step_bits {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StepValue {
        Flag(bool),
        Bit(u8),
    }

    pub fn serialize<S: Serializer>(steps: &[bool], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(steps.iter().map(|&on| u8::from(on)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<bool>, D::Error> {
        Vec::<StepValue>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                StepValue::Flag(on) => Ok(on),
                StepValue::Bit(0) => Ok(false),
                StepValue::Bit(1) => Ok(true),
                StepValue::Bit(other) => Err(D::Error::custom(format!("step value {other} is not 0 or 1"))),
            })
            .collect()
    }
}
