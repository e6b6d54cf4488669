//! PatternStore - the live, editable pattern
//!
//! Four fixed-length rows, one per voice. Rows are plain arrays, so loading a
//! preset copies it by value and later edits never reach back into the preset
//! library.

use super::{Grid, Preset, Row, SequencerError, Voice, STEPS};

/// Live step pattern for the whole kit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternStore {
    grid: Grid,
}

impl PatternStore {
    /// Create an empty (all steps off) store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a preset already loaded
    pub fn from_preset(preset: &Preset) -> Result<Self, SequencerError> {
        Ok(Self { grid: preset.to_grid()? })
    }

    #[inline]
    fn check_step(step: usize) -> Result<(), SequencerError> {
        if step < STEPS {
            Ok(())
        } else {
            Err(SequencerError::InvalidStep { step })
        }
    }

    /// Read one cell
    pub fn get(&self, voice: Voice, step: usize) -> Result<bool, SequencerError> {
        Self::check_step(step)?;
        Ok(self.grid[voice.index()][step])
    }

    /// Flip one cell, returning its new value
    pub fn toggle(&mut self, voice: Voice, step: usize) -> Result<bool, SequencerError> {
        Self::check_step(step)?;
        let cell = &mut self.grid[voice.index()][step];
        *cell = !*cell;
        Ok(*cell)
    }

    /// Set one cell explicitly
    pub fn set(&mut self, voice: Voice, step: usize, on: bool) -> Result<(), SequencerError> {
        Self::check_step(step)?;
        self.grid[voice.index()][step] = on;
        Ok(())
    }

    /// Replace the whole pattern with a copy of `preset`
    ///
    /// The preset is validated before anything is written; on error the current
    /// pattern is left untouched.
    pub fn load(&mut self, preset: &Preset) -> Result<(), SequencerError> {
        self.grid = preset.to_grid()?;
        Ok(())
    }

    /// Turn every step off
    pub fn clear(&mut self) {
        self.grid = [[false; STEPS]; Voice::COUNT];
    }

    pub fn row(&self, voice: Voice) -> &Row {
        &self.grid[voice.index()]
    }

    /// Copy of the full grid (for handing to the UI)
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Voices that are on at `step`, in storage order
    ///
    /// `step` is taken modulo the loop length; the clock owns a valid index so
    /// this never fails.
    pub fn active_at(&self, step: usize) -> [bool; Voice::COUNT] {
        let step = step % STEPS;
        let mut active = [false; Voice::COUNT];
        for voice in Voice::ALL {
            active[voice.index()] = self.grid[voice.index()][step];
        }
        active
    }

    /// Number of steps that are on, across all voices
    pub fn active_count(&self) -> usize {
        self.grid.iter().flatten().filter(|&&on| on).count()
    }
}
