pub mod engine; // Single-writer drum machine driven by the audio callback
pub mod kit; // Drum samples and one-shot playback
pub mod particles; // Generative particle background
pub mod sequencing; // Patterns, presets and the step clock
pub mod transport;

pub const MAX_BLOCK_SIZE: usize = 2048;
