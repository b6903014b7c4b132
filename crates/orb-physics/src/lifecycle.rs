//! Spawning, respawning and full-population resets

use crate::constants::*;
use crate::particle::{Particle, ParticleState};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use std::ops::Range;

/// Inputs needed to place a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    /// Nominal shell radius
    pub radius: f32,
    /// Scale of the random initial velocity
    pub speed: f32,
}

/// Distance band `[0.6 r, 1.1 r)` that new particles are placed in
pub fn respawn_band(radius: f32) -> Range<f32> {
    radius * SPAWN_BAND_MIN..radius * SPAWN_BAND_MAX
}

/// Respawn policy for a fixed-size population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifecycle {
    /// Particles closer to the origin than this are reinitialized
    pub respawn_distance: f32,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            respawn_distance: RESPAWN_DISTANCE,
        }
    }
}

impl Lifecycle {
    /// True when the particle fell into the center or blew up numerically
    pub fn needs_respawn(&self, particle: &Particle) -> bool {
        !particle.is_finite() || particle.distance() < self.respawn_distance
    }

    /// Place `particle` on a random shell and reset its color slot.
    ///
    /// Direction is uniform on the sphere (inverse-cosine polar angle, uniform
    /// azimuth); velocity is symmetric around zero and scaled by `speed`.
    pub fn initialize_one<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        color_slot: &mut [f32],
        params: &SpawnParams,
        rng: &mut R,
    ) {
        let band = SPAWN_BAND_MIN + rng.random::<f32>() * (SPAWN_BAND_MAX - SPAWN_BAND_MIN);
        let radius = params.radius * band;
        let theta = rng.random::<f32>() * TAU;
        let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

        particle.position = Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        );
        particle.velocity = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
        ) * params.speed;

        color_slot.copy_from_slice(&BASE_COLOR);
    }

    /// Initialize every particle in `state` and sync the position buffer
    pub fn initialize_all<R: Rng + ?Sized>(
        &self,
        state: &mut ParticleState,
        params: &SpawnParams,
        rng: &mut R,
    ) {
        let (particles, positions, colors) = state.parts_mut();
        for (i, particle) in particles.iter_mut().enumerate() {
            self.initialize_one(particle, &mut colors[i * 3..i * 3 + 3], params, rng);
            positions[i * 3..i * 3 + 3].copy_from_slice(&particle.position.to_array());
        }
    }

    /// Throw the whole population away and build `count` fresh particles.
    ///
    /// Both buffers are reallocated to `3 * count`; there is no partial resize.
    pub fn resize<R: Rng + ?Sized>(
        &self,
        state: &mut ParticleState,
        count: usize,
        params: &SpawnParams,
        rng: &mut R,
    ) {
        let previous = state.len();
        state.reallocate(count);
        self.initialize_all(state, params, rng);
        log::info!(
            "Particle population reset: {} -> {} (generation {})",
            previous,
            count,
            state.generation()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(radius: f32) -> SpawnParams {
        SpawnParams { radius, speed: 3.0 }
    }

    #[test]
    fn test_resize_scenario_band() {
        let lifecycle = Lifecycle::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = ParticleState::default();
        lifecycle.resize(&mut state, 500, &params(2.0), &mut rng);

        assert_eq!(state.len(), 500);
        assert_eq!(state.positions().len(), 1500);
        assert_eq!(state.colors().len(), 1500);
        for p in state.particles() {
            let d = p.distance();
            assert!(d >= 2.0 * 0.6 - 1e-4 && d <= 2.0 * 1.1 + 1e-4, "distance {d}");
        }
    }

    #[test]
    fn test_initialize_writes_base_color_and_position() {
        let lifecycle = Lifecycle::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = ParticleState::with_count(3);
        lifecycle.initialize_all(&mut state, &params(1.0), &mut rng);

        assert_eq!(&state.colors()[3..6], &BASE_COLOR);
        let p = state.particle(2).unwrap().position;
        assert_eq!(&state.positions()[6..9], &p.to_array());
    }

    #[test]
    fn test_velocity_bounded_by_speed() {
        let lifecycle = Lifecycle::default();
        let mut rng = StdRng::seed_from_u64(99);
        let mut particle = Particle::default();
        let mut slot = [0.0; 3];
        for _ in 0..200 {
            lifecycle.initialize_one(&mut particle, &mut slot, &params(1.0), &mut rng);
            let v = particle.velocity;
            assert!(v.abs().max_element() <= 1.5 + 1e-4);
        }
    }

    #[test]
    fn test_needs_respawn() {
        let lifecycle = Lifecycle::default();
        assert!(lifecycle.needs_respawn(&Particle::new(Vec3::splat(0.01), Vec3::ZERO)));
        assert!(!lifecycle.needs_respawn(&Particle::new(Vec3::X, Vec3::ZERO)));
        assert!(lifecycle.needs_respawn(&Particle::new(Vec3::new(f32::NAN, 1.0, 1.0), Vec3::ZERO)));
    }

    #[test]
    fn test_respawn_band() {
        let band = respawn_band(2.0);
        assert!((band.start - 1.2).abs() < 1e-6);
        assert!((band.end - 2.2).abs() < 1e-6);
    }
}
