//! Interactive 2D particle field.
//!
//! Particles drift and bounce inside the window, link to their nearest
//! neighbours with tapered gradient lines, and react to the pointer through a
//! switchable force field (push, attract, orbit).  The binary in `main.rs`
//! wires [`simulation::ParticleFieldPlugin`] into a windowed Bevy app; the
//! modules below are also usable headless for tests.

pub mod config;
pub mod constants;
pub mod error;
pub mod force_field;
pub mod graphics;
pub mod input;
pub mod links;
pub mod notification;
pub mod particle;
pub mod rendering;
pub mod simulation;
pub mod spatial_partition;
