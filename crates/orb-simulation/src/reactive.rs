//! Typed settings writes with their side effects
//!
//! [`ReactiveSettings`] is a short-lived borrow over everything a setting can
//! touch. Each setter validates, stores, and then propagates synchronously, so
//! the next tick always sees the new value. Once the orb is stopped every
//! setter fails with [`SettingsError::Stopped`] and touches nothing.

use crate::backend::RenderBackend;
use crate::color::ColorInterpolator;
use crate::error::SettingsError;
use crate::settings::{ensure_finite, Settings};
use orb_physics::{Lifecycle, ParticleState};
use rand::rngs::StdRng;

pub struct ReactiveSettings<'a, B: RenderBackend + ?Sized> {
    pub(crate) settings: &'a mut Settings,
    pub(crate) state: &'a mut ParticleState,
    pub(crate) color: &'a mut ColorInterpolator,
    pub(crate) backend: &'a mut B,
    pub(crate) lifecycle: &'a Lifecycle,
    pub(crate) rng: &'a mut StdRng,
    pub(crate) stopped: bool,
}

impl<B: RenderBackend + ?Sized> ReactiveSettings<'_, B> {
    pub fn get(&self) -> &Settings {
        &*self.settings
    }

    fn ensure_live(&self) -> Result<(), SettingsError> {
        if self.stopped {
            return Err(SettingsError::Stopped);
        }
        Ok(())
    }

    /// New interpolation target; the visible color follows over the next ticks
    pub fn set_color(&mut self, hex: u32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        self.settings.color = hex;
        self.color.set_target(hex);
        log::debug!("Color target -> #{:06x}", hex);
        Ok(())
    }

    /// Rebuild the whole population at `count`.
    ///
    /// Old geometry is released before the new one is installed.
    pub fn set_particle_count(&mut self, count: usize) -> Result<(), SettingsError> {
        self.ensure_live()?;
        if count == 0 {
            return Err(SettingsError::EmptyPopulation);
        }
        self.settings.particle_count = count;
        self.backend.release_geometry();
        self.lifecycle
            .resize(self.state, count, &self.settings.spawn_params(), self.rng);
        self.backend
            .install_geometry(self.state.len(), self.state.generation());
        Ok(())
    }

    pub fn set_motion_blur_damp(&mut self, damp: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("motion_blur_damp", damp)?;
        self.settings.motion_blur_damp = damp;
        self.backend.set_afterimage_damp(damp);
        Ok(())
    }

    /// Push the new bloom and redraw immediately, outside the tick cycle
    pub fn set_bloom_strength(&mut self, strength: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("bloom_strength", strength)?;
        self.settings.bloom_strength = strength;
        self.backend.set_bloom(self.settings.bloom());
        if let Err(e) = self.backend.render() {
            log::warn!("Off-cycle render after bloom change failed: {}", e);
        }
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("speed", speed)?;
        self.settings.speed = speed;
        Ok(())
    }

    pub fn set_curl_size(&mut self, curl_size: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("curl_size", curl_size)?;
        self.settings.curl_size = curl_size;
        Ok(())
    }

    pub fn set_attraction(&mut self, attraction: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("attraction", attraction)?;
        self.settings.attraction = attraction;
        Ok(())
    }

    pub fn set_swirl_force(&mut self, swirl_force: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("swirl_force", swirl_force)?;
        self.settings.swirl_force = swirl_force;
        Ok(())
    }

    /// Takes effect on the next respawn or resize
    pub fn set_radius(&mut self, radius: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("radius", radius)?;
        self.settings.radius = radius;
        Ok(())
    }

    pub fn set_spin_speed(&mut self, spin_speed: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("spin_speed", spin_speed)?;
        self.settings.spin_speed = spin_speed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Call, RecordingBackend};
    use rand::SeedableRng;

    struct Parts {
        settings: Settings,
        state: ParticleState,
        color: ColorInterpolator,
        backend: RecordingBackend,
        lifecycle: Lifecycle,
        rng: StdRng,
    }

    impl Parts {
        fn new() -> Self {
            let settings = Settings::default();
            Self {
                state: ParticleState::with_count(10),
                color: ColorInterpolator::new(settings.color),
                backend: RecordingBackend::default(),
                lifecycle: Lifecycle::default(),
                rng: StdRng::seed_from_u64(3),
                settings,
            }
        }

        fn reactive(&mut self) -> ReactiveSettings<'_, RecordingBackend> {
            ReactiveSettings {
                settings: &mut self.settings,
                state: &mut self.state,
                color: &mut self.color,
                backend: &mut self.backend,
                lifecycle: &self.lifecycle,
                rng: &mut self.rng,
                stopped: false,
            }
        }
    }

    #[test]
    fn test_particle_count_releases_before_install() {
        let mut parts = Parts::new();
        parts.reactive().set_particle_count(42).unwrap();

        assert_eq!(parts.state.len(), 42);
        assert_eq!(parts.state.positions().len(), 126);
        assert_eq!(parts.state.colors().len(), 126);
        let generation = parts.state.generation();
        assert_eq!(
            parts.backend.calls,
            vec![Call::Release, Call::Install(42, generation)]
        );
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut parts = Parts::new();
        assert_eq!(
            parts.reactive().set_particle_count(0),
            Err(SettingsError::EmptyPopulation)
        );
        assert!(parts.backend.calls.is_empty());
        assert_eq!(parts.state.len(), 10);
    }

    #[test]
    fn test_bloom_triggers_render() {
        let mut parts = Parts::new();
        parts.reactive().set_bloom_strength(0.7).unwrap();
        assert_eq!(parts.backend.calls, vec![Call::Bloom(0.7), Call::Render]);
        assert_eq!(parts.settings.bloom_strength, 0.7);
    }

    #[test]
    fn test_motion_blur_forwarded() {
        let mut parts = Parts::new();
        parts.reactive().set_motion_blur_damp(0.11).unwrap();
        assert_eq!(parts.backend.calls, vec![Call::Damp(0.11)]);
    }

    #[test]
    fn test_nan_never_stored() {
        let mut parts = Parts::new();
        assert!(parts.reactive().set_speed(f32::NAN).is_err());
        assert!(parts.reactive().set_swirl_force(f32::INFINITY).is_err());
        assert_eq!(parts.settings, Settings::default());
    }

    #[test]
    fn test_color_sets_target_only() {
        let mut parts = Parts::new();
        let before = parts.color.current();
        parts.reactive().set_color(0x0000ff).unwrap();
        assert_eq!(parts.color.target(), glam::Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(parts.color.current(), before);
        assert_eq!(parts.settings.color, 0x0000ff);
    }

    #[test]
    fn test_stopped_setters_touch_nothing() {
        let mut parts = Parts::new();
        let mut settings = parts.reactive();
        settings.stopped = true;
        assert_eq!(settings.set_particle_count(5), Err(SettingsError::Stopped));
        assert_eq!(settings.set_bloom_strength(0.9), Err(SettingsError::Stopped));
        assert_eq!(settings.set_speed(1.0), Err(SettingsError::Stopped));

        assert!(parts.backend.calls.is_empty());
        assert_eq!(parts.settings, Settings::default());
        assert_eq!(parts.state.len(), 10);
    }
}
