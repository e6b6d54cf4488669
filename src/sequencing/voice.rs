use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SequencerError;

/// One of the four drum instruments in the kit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Kick,
    Snare,
    OpenHat,
    ClosedHat,
}

impl Voice {
    pub const COUNT: usize = 4;

    /// Every voice, in storage order
    pub const ALL: [Voice; Voice::COUNT] = [Voice::Kick, Voice::Snare, Voice::OpenHat, Voice::ClosedHat];

    /// Voices in the order the grid draws its rows
    pub const GRID_ORDER: [Voice; Voice::COUNT] = [Voice::Kick, Voice::Snare, Voice::ClosedHat, Voice::OpenHat];

    /// Position of this voice in per-voice arrays
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Voice::Kick => 0,
            Voice::Snare => 1,
            Voice::OpenHat => 2,
            Voice::ClosedHat => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Voice::Kick => "kick",
            Voice::Snare => "snare",
            Voice::OpenHat => "open_hat",
            Voice::ClosedHat => "closed_hat",
        }
    }

    /// File name (`<name>.wav`) looked up when loading a sample directory
    pub fn file_name(self) -> String {
        format!("{}.wav", self.name())
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Voice {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick" => Ok(Voice::Kick),
            "snare" => Ok(Voice::Snare),
            "open_hat" | "open_hh" => Ok(Voice::OpenHat),
            "closed_hat" | "closed_hh" => Ok(Voice::ClosedHat),
            other => Err(SequencerError::UnknownVoice(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, voice) in Voice::ALL.iter().enumerate() {
            assert_eq!(voice.index(), i);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("kick".parse::<Voice>().unwrap(), Voice::Kick);
        assert_eq!("snare".parse::<Voice>().unwrap(), Voice::Snare);
        assert_eq!("open_hat".parse::<Voice>().unwrap(), Voice::OpenHat);
        assert_eq!("closed_hh".parse::<Voice>().unwrap(), Voice::ClosedHat);
    }

    #[test]
    fn test_unknown_voice_is_rejected() {
        let err = "cowbell".parse::<Voice>().unwrap_err();
        assert_eq!(err, SequencerError::UnknownVoice("cowbell".into()));
    }

    #[test]
    fn test_file_name_is_wav_of_name() {
        assert_eq!(Voice::Kick.file_name(), "kick.wav");
        assert_eq!(Voice::OpenHat.file_name(), "open_hat.wav");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for voice in Voice::ALL {
            assert_eq!(voice.to_string().parse::<Voice>().unwrap(), voice);
        }
    }
}
