//! Real-time SPH (Smoothed Particle Hydrodynamics) fluid core.
//!
//! A fixed population of particles is advanced one fixed timestep at a time
//! through the pipeline
//! external forces -> spatial index -> density/pressure -> pressure/viscosity
//! -> integrate -> boundary resolution.
//!
//! # Modules
//! - [`fluids`] -- smoothing kernels and the density / force stages.
//! - [`grid`] -- uniform-grid spatial hashing with swappable backends.
//! - [`particle`] -- struct-of-arrays particle store and neighbor arena.
//! - [`solver`] -- the per-step pipeline.
//! - [`config`] / [`error`] -- embedder configuration and its validation.
//! - [`spawn`] -- jittered lattice initial conditions.
//! - [`stats`] -- per-step summary numbers.

pub mod boundary;
pub mod config;
pub mod error;
pub mod fluids;
pub mod grid;
pub mod particle;
pub mod solver;
pub mod spawn;
pub mod stats;

pub use config::{BoundaryBox, FluidConfig, GridBackend};
pub use error::ConfigError;
pub use particle::{ParticleSet, ParticleState};
pub use solver::Solver;
pub use stats::StepStats;
