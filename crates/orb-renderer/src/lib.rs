//! # Orb Renderer
//!
//! wgpu backend for the flavor orb: additive point sprites, bloom, afterimage,
//! frame read-back for captures, and the egui overlay.

pub mod camera;
pub mod overlay;
pub mod renderer;

pub use camera::*;
pub use overlay::*;
pub use renderer::*;
