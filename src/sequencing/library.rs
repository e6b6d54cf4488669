//! Preset library - built-in grooves plus presets loaded from JSON

#[cfg(feature = "serde")]
use std::path::Path;
use std::path::PathBuf;

use rand::Rng;
use thiserror::Error;

use super::{Preset, SequencerError};

/// Errors from building a preset library
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read presets from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "serde")]
    #[error("failed to parse preset JSON")]
    Json(#[from] serde_json::Error),
    #[error("preset library has no valid presets")]
    Empty,
}

/// An ordered, validated collection of presets
///
/// Every preset in a library has already passed `Preset::validate`, so loading
/// one into a `PatternStore` cannot fail.
#[derive(Debug, Clone)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    /// Build a library, dropping malformed presets
    pub fn new(presets: impl IntoIterator<Item = Preset>) -> Result<Self, PresetError> {
        let presets: Vec<Preset> = presets
            .into_iter()
            .filter(|preset| match preset.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed preset");
                    false
                }
            })
            .collect();

        if presets.is_empty() {
            return Err(PresetError::Empty);
        }

        tracing::debug!(count = presets.len(), "preset library ready");
        Ok(Self { presets })
    }

    /// The grooves that ship with the machine
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                Preset::from_bits(
                    "groove_one",
                    [1,0,0,0,0,0,1,0,1,0,0,0,0,0,0,0],
                    [0,0,0,1,0,0,0,0,0,0,0,0,1,0,0,0],
                    [0,0,0,0,0,0,0,0,0,0,1,0,0,0,1,0],
                    [0,0,1,0,1,1,0,0,0,1,0,1,0,1,0,1],
                ),
                Preset::from_bits(
                    "groove_two",
                    [0,0,1,0,1,0,0,1,0,0,0,0,1,1,0,0],
                    [1,0,0,0,0,0,0,0,0,1,0,0,0,0,1,0],
                    [0,0,0,1,0,0,1,0,0,1,0,0,1,0,0,0],
                    [0,1,1,0,1,1,0,1,1,0,1,1,0,1,1,0],
                ),
                Preset::from_bits(
                    "dance",
                    [1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0],
                    [0,0,0,0,1,0,0,0,0,0,0,0,1,0,0,0],
                    [0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0],
                    [0,0,0,0,0,0,0,1,0,0,0,0,0,0,0,1],
                ),
            ],
        }
    }

    /// Parse a JSON array of presets
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Self::new(presets)
    }

    /// Read a JSON preset file
    #[cfg(feature = "serde")]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), count = library.len(), "loaded preset file");
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    /// Look a preset up by name, returning its index
    pub fn find(&self, name: &str) -> Result<usize, SequencerError> {
        self.presets
            .iter()
            .position(|preset| preset.name == name)
            .ok_or_else(|| SequencerError::UnknownPreset(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.name.as_str())
    }

    /// Pick a preset index uniformly at random
    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.presets.len())
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::{Voice, STEPS};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_builtin_presets_are_valid() {
        let library = PresetLibrary::builtin();
        assert_eq!(library.len(), 3);
        for preset in library.iter() {
            assert!(preset.validate().is_ok(), "{} should be valid", preset.name);
        }
        assert_eq!(library.names().collect::<Vec<_>>(), ["groove_one", "groove_two", "dance"]);
    }

    #[test]
    fn test_find_by_name() {
        let library = PresetLibrary::builtin();
        assert_eq!(library.find("dance").unwrap(), 2);
        assert_eq!(
            library.find("polka"),
            Err(SequencerError::UnknownPreset("polka".into()))
        );
    }

    #[test]
    fn test_new_drops_malformed_presets() {
        let mut broken = Preset::silent("broken");
        broken.kick = vec![true; STEPS + 1];

        let library = PresetLibrary::new([Preset::silent("ok"), broken]).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(0).unwrap().name, "ok");
    }

    #[test]
    fn test_new_rejects_empty_library() {
        let mut broken = Preset::silent("broken");
        broken.row_mut(Voice::Snare).clear();

        assert!(matches!(PresetLibrary::new([broken]), Err(PresetError::Empty)));
        assert!(matches!(PresetLibrary::new(Vec::<Preset>::new()), Err(PresetError::Empty)));
    }

    #[test]
    fn test_random_index_stays_in_range() {
        let library = PresetLibrary::builtin();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(library.random_index(&mut rng) < library.len());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_path_reads_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let presets = vec![PresetLibrary::builtin().get(2).unwrap().clone()];
        write!(file, "{}", serde_json::to_string(&presets).unwrap()).unwrap();

        let library = PresetLibrary::from_path(file.path()).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(0).unwrap(), &presets[0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            PresetLibrary::from_path(&missing),
            Err(PresetError::Io { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_reports_syntax_errors() {
        assert!(matches!(PresetLibrary::from_json("[{"), Err(PresetError::Json(_))));
    }
}
