//! Particle records and the flat buffers handed to the renderer

use glam::Vec3;

/// A single point mass in the cloud
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    /// Position in world space
    pub position: Vec3,
    /// Velocity in units per second
    pub velocity: Vec3,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// Distance from the origin
    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// The whole population plus its render-facing buffers.
///
/// `positions` and `colors` are index-aligned with `particles`:
/// `buffer[3 * i..3 * i + 3]` belongs to particle `i`. Both buffers always hold
/// exactly `3 * len()` floats. The only way to change the population size is a
/// full reallocation, which bumps `generation`.
#[derive(Debug, Clone, Default)]
pub struct ParticleState {
    particles: Vec<Particle>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    generation: u64,
    dirty: bool,
}

impl ParticleState {
    /// Allocate `count` zeroed particles and buffers
    pub fn with_count(count: usize) -> Self {
        let mut state = Self::default();
        state.reallocate(count);
        state
    }

    /// Drop every particle and allocate fresh zeroed storage for `count`.
    ///
    /// Callers are expected to initialize each particle afterwards; see
    /// [`crate::Lifecycle::resize`].
    pub fn reallocate(&mut self, count: usize) {
        // Replace rather than resize so the old allocations are released first.
        self.particles = Vec::new();
        self.positions = Vec::new();
        self.colors = Vec::new();

        self.particles = vec![Particle::default(); count];
        self.positions = vec![0.0; count * 3];
        self.colors = vec![0.0; count * 3];
        self.generation += 1;
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Mutable access to one particle (tests and tools)
    pub fn particle_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// Flat xyz positions, `3 * len()` floats
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat rgb colors, `3 * len()` floats
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Incremented on every reallocation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when the buffers were written since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Split borrow used by the integrator: particles plus both output buffers
    pub fn parts_mut(&mut self) -> (&mut [Particle], &mut [f32], &mut [f32]) {
        self.dirty = true;
        (&mut self.particles, &mut self.positions, &mut self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_match_population() {
        let state = ParticleState::with_count(17);
        assert_eq!(state.len(), 17);
        assert_eq!(state.positions().len(), 51);
        assert_eq!(state.colors().len(), 51);
    }

    #[test]
    fn test_reallocate_bumps_generation() {
        let mut state = ParticleState::with_count(4);
        let first = state.generation();
        state.reallocate(8);
        assert_eq!(state.generation(), first + 1);
        assert_eq!(state.len(), 8);
        assert_eq!(state.positions().len(), 24);
    }
}
