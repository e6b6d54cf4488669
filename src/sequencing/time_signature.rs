use std::fmt;

/// Time signature, used to decide how many sixteenths make a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Number of beats per bar (numerator)
    pub numerator: u8,
    /// Note value that gets one beat (denominator: 4 = quarter, 8 = eighth)
    pub denominator: u8,
}

impl TimeSignature {
    /// Standard 4/4 time
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    /// 3/4 time
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        numerator: 3,
        denominator: 4,
    };

    /// 6/8 time
    pub const SIX_EIGHT: TimeSignature = TimeSignature {
        numerator: 6,
        denominator: 8,
    };

    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Sixteenth notes in one bar
    /// Formula: numerator * (16 / denominator), never less than one
    pub fn sixteenths_per_bar(&self) -> u32 {
        let denominator = u32::from(self.denominator.max(1));
        (u32::from(self.numerator) * 16 / denominator).max(1)
    }

    /// Sixteenth notes in one beat (quarter note = 4)
    pub fn sixteenths_per_beat(&self) -> u32 {
        (16 / u32::from(self.denominator.max(1))).max(1)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
