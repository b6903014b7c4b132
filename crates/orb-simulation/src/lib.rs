//! # Orb Simulation
//!
//! CPU particle orb driven by flavor inputs. Owns the particle buffers and the
//! settings, and talks to a renderer only through [`RenderBackend`].

pub mod backend;
pub mod capture;
pub mod color;
pub mod config;
pub mod error;
pub mod flavor;
pub mod reactive;
pub mod settings;
pub mod simulation;
pub mod startup;

pub use backend::*;
pub use capture::*;
pub use color::*;
pub use config::*;
pub use error::*;
pub use flavor::*;
pub use reactive::*;
pub use settings::*;
pub use simulation::*;
pub use startup::*;

pub use orb_physics;
