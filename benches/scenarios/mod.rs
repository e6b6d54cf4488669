//! Real-world scenario benchmarks.
//!
//! These model what the app does every callback and every frame.

mod physics;
mod playback;

pub use physics::bench_physics;
pub use playback::bench_playback;
