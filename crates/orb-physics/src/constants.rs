//! Tuning constants for the orb force field
//!
//! These values are not derived from settings. They define the canonical
//! motion profile of the cloud; the flavor-driven knobs live in `Settings`.

/// Velocity multiplier applied after every integration step
pub const DAMPING: f32 = 0.8;

/// Particles closer than this to the origin are respawned
pub const RESPAWN_DISTANCE: f32 = 0.1;

/// Lower bound of the spawn shell, as a fraction of the configured radius
pub const SPAWN_BAND_MIN: f32 = 0.6;

/// Upper bound (exclusive) of the spawn shell, as a fraction of the radius
pub const SPAWN_BAND_MAX: f32 = 1.1;

/// Per-axis index multipliers for the turbulence signal.
/// x and y use `time + i * phase`, z uses `time * phase + i`.
pub const TURBULENCE_PHASE_X: f32 = 0.1;
pub const TURBULENCE_PHASE_Y: f32 = 0.1;
pub const TURBULENCE_PHASE_Z: f32 = 0.1;

/// Reference axis for the swirl tangent
pub const SWIRL_UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Alternate axis used when the radial vector is nearly parallel to `SWIRL_UP`
pub const SWIRL_FALLBACK: [f32; 3] = [1.0, 0.0, 0.0];

/// |radial · up| above this switches to `SWIRL_FALLBACK`
pub const SWIRL_PARALLEL_LIMIT: f32 = 0.99;

/// Color written into a freshly spawned particle's slot (warm yellow)
pub const BASE_COLOR: [f32; 3] = [1.0, 1.0, 0.2];

/// Camera distance at which the depth cue reaches its floor
pub const DEPTH_FADE_DISTANCE: f32 = 15.0;

/// Minimum brightness of the depth cue
pub const MIN_BRIGHTNESS: f32 = 0.2;
