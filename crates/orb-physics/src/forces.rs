//! Per-particle force field and integration step
//!
//! Every particle is advanced independently: nothing here reads another
//! particle's state, so the population step can be split across threads if it
//! ever needs to be. The only shared input is the frame `time`.

use crate::constants::*;
use crate::particle::Particle;
use glam::Vec3;

/// How the centripetal pull is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttractionScaling {
    /// `attraction * speed * dt`
    #[default]
    BySpeed,
    /// `attraction * dt`
    Unscaled,
}

/// The settings-driven knobs of the force field, sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub attraction: f32,
    pub speed: f32,
    pub curl_size: f32,
    pub swirl_force: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            attraction: 0.035,
            speed: 3.0,
            curl_size: 0.5,
            swirl_force: 0.0,
        }
    }
}

/// Attraction + turbulence + swirl, explicit Euler, constant damping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceModel {
    pub attraction_scaling: AttractionScaling,
    pub damping: f32,
}

impl Default for ForceModel {
    fn default() -> Self {
        Self {
            attraction_scaling: AttractionScaling::BySpeed,
            damping: DAMPING,
        }
    }
}

impl ForceModel {
    pub fn with_scaling(mut self, scaling: AttractionScaling) -> Self {
        self.attraction_scaling = scaling;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Velocity change pulling the particle toward the origin.
    /// A particle sitting exactly on the origin gets no pull.
    pub fn attraction(&self, position: Vec3, params: &ForceParams, dt: f32) -> Vec3 {
        let scale = match self.attraction_scaling {
            AttractionScaling::BySpeed => params.attraction * params.speed,
            AttractionScaling::Unscaled => params.attraction,
        };
        (-position).normalize_or_zero() * scale * dt
    }

    /// Advance one particle by `dt` seconds.
    ///
    /// `index` feeds the turbulence phase. Respawning is not handled here; see
    /// [`crate::lifecycle::Lifecycle::needs_respawn`].
    pub fn step(&self, particle: &mut Particle, params: &ForceParams, dt: f32, time: f32, index: usize) {
        let dv = self.attraction(particle.position, params, dt)
            + turbulence(time, index, params, dt)
            + swirl(particle.position, params, dt);

        particle.velocity += dv;
        particle.position += particle.velocity * dt;
        particle.velocity *= self.damping;
    }
}

/// Globally correlated pseudo-noise: every particle samples the same clock,
/// offset by its index.
pub fn turbulence(time: f32, index: usize, params: &ForceParams, dt: f32) -> Vec3 {
    let i = index as f32;
    let signal = Vec3::new(
        (time + i * TURBULENCE_PHASE_X).sin(),
        (time + i * TURBULENCE_PHASE_Y).cos(),
        (time * TURBULENCE_PHASE_Z + i).sin(),
    );
    signal * params.curl_size * params.speed * dt
}

/// Unit tangent used for the orbital push at `position`.
///
/// Uses `radial × up`, swapping `up` for the fallback axis when the two are
/// nearly parallel. Returns zero at the origin.
pub fn swirl_tangent(position: Vec3) -> Vec3 {
    let radial = position.normalize_or_zero();
    if radial == Vec3::ZERO {
        return Vec3::ZERO;
    }

    let mut reference = Vec3::from_array(SWIRL_UP);
    if radial.dot(reference).abs() > SWIRL_PARALLEL_LIMIT {
        reference = Vec3::from_array(SWIRL_FALLBACK);
    }
    radial.cross(reference).normalize_or_zero()
}

/// Tangential velocity change producing orbital motion
pub fn swirl(position: Vec3, params: &ForceParams, dt: f32) -> Vec3 {
    swirl_tangent(position) * params.swirl_force * dt
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_attraction_points_to_origin() {
        let model = ForceModel::default();
        let params = ForceParams {
            attraction: 1.0,
            speed: 2.0,
            ..Default::default()
        };
        let dv = model.attraction(Vec3::new(3.0, 0.0, 0.0), &params, 0.5);
        assert!((dv - Vec3::new(-1.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_unscaled_attraction_ignores_speed() {
        let model = ForceModel::default().with_scaling(AttractionScaling::Unscaled);
        let params = ForceParams {
            attraction: 1.0,
            speed: 10.0,
            ..Default::default()
        };
        let dv = model.attraction(Vec3::new(0.0, 0.0, -4.0), &params, 1.0);
        assert!((dv - Vec3::new(0.0, 0.0, 1.0)).length() < EPS);
    }

    #[test]
    fn test_attraction_at_origin_is_zero() {
        let model = ForceModel::default();
        let dv = model.attraction(Vec3::ZERO, &ForceParams::default(), 0.016);
        assert_eq!(dv, Vec3::ZERO);
    }

    #[test]
    fn test_turbulence_is_deterministic() {
        let params = ForceParams::default();
        let a = turbulence(1.25, 42, &params, 0.016);
        let b = turbulence(1.25, 42, &params, 0.016);
        assert_eq!(a, b);
        assert_ne!(a, turbulence(1.25, 43, &params, 0.016));
    }

    #[test]
    fn test_swirl_tangent_is_perpendicular() {
        let p = Vec3::new(1.0, 0.5, -2.0);
        let t = swirl_tangent(p);
        assert!((t.length() - 1.0).abs() < EPS);
        assert!(t.dot(p.normalize()).abs() < EPS);
    }

    #[test]
    fn test_swirl_tangent_on_up_axis_uses_fallback() {
        let t = swirl_tangent(Vec3::new(0.0, 2.0, 0.0));
        assert!((t.length() - 1.0).abs() < EPS);
        // radial = +Y, fallback = +X -> Y x X = -Z
        assert!((t - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
    }

    #[test]
    fn test_step_integrates_then_damps() {
        let model = ForceModel::default();
        let params = ForceParams {
            attraction: 0.0,
            speed: 0.0,
            curl_size: 0.0,
            swirl_force: 0.0,
        };
        let mut p = Particle::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        model.step(&mut p, &params, 0.5, 0.0, 0);

        assert!((p.position.x - 1.5).abs() < EPS);
        assert!((p.velocity.x - DAMPING).abs() < EPS);
    }

    #[test]
    fn test_step_stays_finite_at_origin() {
        let model = ForceModel::default();
        let params = ForceParams {
            swirl_force: 1.0,
            ..Default::default()
        };
        let mut p = Particle::default();
        model.step(&mut p, &params, 0.016, 3.0, 7);
        assert!(p.is_finite());
    }
}
