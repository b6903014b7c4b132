//! Runtime settings for the orb
//!
//! `Settings` is a plain record. Writes that must propagate somewhere go
//! through [`crate::ReactiveSettings`]; this module only knows about values.

use crate::error::SettingsError;
use orb_physics::{ForceParams, SpawnParams};
use serde::Deserialize;

/// Simulation and rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Turbulence amplitude
    pub curl_size: f32,
    /// Global motion scale (turbulence, attraction, spawn velocity)
    pub speed: f32,
    /// Nominal spawn shell radius
    pub radius: f32,
    /// Pull toward the center
    pub attraction: f32,
    /// Tangential orbital push
    pub swirl_force: f32,
    /// Afterimage damping forwarded to the renderer
    pub motion_blur_damp: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    /// Rotation of the whole cloud about +Y, radians per second
    pub spin_speed: f32,
    pub particle_count: usize,
    /// `0xRRGGBB`
    pub color: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            curl_size: 0.5,
            speed: 3.0,
            radius: 2.0,
            attraction: 0.035,
            swirl_force: 0.0,
            motion_blur_damp: 0.05,
            bloom_strength: 0.1,
            bloom_radius: 1.0,
            bloom_threshold: 1.0,
            spin_speed: 0.0,
            particle_count: 3000,
            color: 0xfff307,
        }
    }
}

impl Settings {
    /// Reject values that would poison the integrator
    pub fn validate(&self) -> Result<(), SettingsError> {
        let floats = [
            ("curl_size", self.curl_size),
            ("speed", self.speed),
            ("radius", self.radius),
            ("attraction", self.attraction),
            ("swirl_force", self.swirl_force),
            ("motion_blur_damp", self.motion_blur_damp),
            ("bloom_strength", self.bloom_strength),
            ("bloom_radius", self.bloom_radius),
            ("bloom_threshold", self.bloom_threshold),
            ("spin_speed", self.spin_speed),
        ];
        for (field, value) in floats {
            ensure_finite(field, value)?;
        }
        if self.particle_count == 0 {
            return Err(SettingsError::EmptyPopulation);
        }
        Ok(())
    }

    pub fn force_params(&self) -> ForceParams {
        ForceParams {
            attraction: self.attraction,
            speed: self.speed,
            curl_size: self.curl_size,
            swirl_force: self.swirl_force,
        }
    }

    pub fn spawn_params(&self) -> SpawnParams {
        SpawnParams {
            radius: self.radius,
            speed: self.speed,
        }
    }

    pub fn bloom(&self) -> BloomParams {
        BloomParams {
            strength: self.bloom_strength,
            radius: self.bloom_radius,
            threshold: self.bloom_threshold,
        }
    }
}

/// Bloom stage parameters as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::NonFinite { field, value })
    }
}

/// Partial update from the UI layer.
///
/// `None` means "leave alone". Zero values (and a black `color` of `0`) are
/// also treated as "leave alone", so a slider that reports `0` never wipes a
/// setting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsUpdate {
    pub color: Option<u32>,
    pub speed: Option<f32>,
    pub curl_size: Option<f32>,
    pub motion_blur_damp: Option<f32>,
    pub bloom_strength: Option<f32>,
    pub particle_count: Option<usize>,
}

impl SettingsUpdate {
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_curl_size(mut self, curl_size: f32) -> Self {
        self.curl_size = Some(curl_size);
        self
    }

    pub fn with_motion_blur_damp(mut self, damp: f32) -> Self {
        self.motion_blur_damp = Some(damp);
        self
    }

    pub fn with_bloom_strength(mut self, strength: f32) -> Self {
        self.bloom_strength = Some(strength);
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = Some(count);
        self
    }

    /// Drop the keys that count as "no update"
    pub fn effective(self) -> Self {
        let nonzero = |v: Option<f32>| v.filter(|v| *v != 0.0);
        Self {
            color: self.color.filter(|c| *c != 0),
            speed: nonzero(self.speed),
            curl_size: nonzero(self.curl_size),
            motion_blur_damp: nonzero(self.motion_blur_damp),
            bloom_strength: nonzero(self.bloom_strength),
            particle_count: self.particle_count.filter(|c| *c != 0),
        }
    }

    /// Check every present float before anything is written
    pub fn validate(&self) -> Result<(), SettingsError> {
        let floats = [
            ("speed", self.speed),
            ("curl_size", self.curl_size),
            ("motion_blur_damp", self.motion_blur_damp),
            ("bloom_strength", self.bloom_strength),
        ];
        for (field, value) in floats {
            if let Some(v) = value {
                ensure_finite(field, v)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let s = Settings::default();
        assert_eq!(s.curl_size, 0.5);
        assert_eq!(s.speed, 3.0);
        assert_eq!(s.radius, 2.0);
        assert_eq!(s.attraction, 0.035);
        assert_eq!(s.particle_count, 3000);
        assert_eq!(s.color, 0xfff307);
        assert_eq!(s.motion_blur_damp, 0.05);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let s = Settings {
            speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(SettingsError::NonFinite { field: "speed", .. })
        ));
    }

    #[test]
    fn test_update_zero_is_no_update() {
        let update = SettingsUpdate::default()
            .with_speed(0.0)
            .with_color(0)
            .with_curl_size(0.7)
            .with_particle_count(0)
            .effective();

        assert_eq!(update.speed, None);
        assert_eq!(update.color, None);
        assert_eq!(update.particle_count, None);
        assert_eq!(update.curl_size, Some(0.7));
    }

    #[test]
    fn test_update_validate_rejects_infinity() {
        let update = SettingsUpdate::default().with_bloom_strength(f32::INFINITY);
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let s: Settings = serde_yaml::from_str("speed: 1.5\nparticle_count: 500\n").unwrap();
        assert_eq!(s.speed, 1.5);
        assert_eq!(s.particle_count, 500);
        assert_eq!(s.radius, 2.0);
    }
}
