//! # Orb Physics
//!
//! Force field, integration and lifecycle for the flavor orb particle cloud.
//! Everything here is CPU-side and renderer agnostic.

pub mod constants;
pub mod forces;
pub mod lifecycle;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use lifecycle::*;
pub use particle::*;
