//! Particle field simulation drawn behind the sequencer grid
//!
//! Simulation only: the field knows nothing about terminals or audio. The UI
//! steps it once per frame with the elapsed time and the pointer state, and
//! calls `teleport` when a new bar starts.

mod field;
mod particle;

pub use field::{ParticleField, PhysicsParams, PointerState, MAX_PARTICLES, MIN_PARTICLES};
pub use particle::{Particle, BOUNCE, DAMPING, MAX_SPEED};
