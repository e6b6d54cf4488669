pub mod clock;
pub mod error;
pub mod library;
pub mod preset;
pub mod store;
pub mod time_signature;
pub mod voice;

pub use clock::{ClockState, StepClock, StepTick, Trigger};
pub use error::SequencerError;
pub use library::{PresetError, PresetLibrary};
pub use preset::Preset;
pub use store::PatternStore;
pub use time_signature::TimeSignature;
pub use voice::Voice;

/// Steps in one loop (one bar of sixteenth notes)
pub const STEPS: usize = 16;

/// One voice's steps
pub type Row = [bool; STEPS];

/// All four voices, indexed by `Voice::index`
pub type Grid = [Row; Voice::COUNT];
