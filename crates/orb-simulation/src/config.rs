//! Optional `flavor-orb.yaml` configuration

use crate::capture::CaptureConfig;
use crate::settings::Settings;
use crate::startup::StartupConfig;
use orb_physics::{AttractionScaling, ForceModel, DAMPING};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "flavor-orb.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub settings: Settings,
    pub capture: CaptureConfig,
    pub startup: StartupConfig,
    pub forces: ForceConfig,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
}

/// Which force-model variant drives the particles
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Pull toward the center without the `speed` factor
    pub unscaled_attraction: bool,
    pub damping: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            unscaled_attraction: false,
            damping: DAMPING,
        }
    }
}

impl ForceConfig {
    pub fn model(&self) -> ForceModel {
        let scaling = if self.unscaled_attraction {
            AttractionScaling::Unscaled
        } else {
            AttractionScaling::BySpeed
        };
        let damping = if self.damping.is_finite() {
            self.damping.clamp(0.0, 1.0)
        } else {
            log::warn!("Ignoring non-finite damping {}", self.damping);
            DAMPING
        };
        ForceModel::default().with_scaling(scaling).with_damping(damping)
    }
}

impl OrbConfig {
    /// Read `path`, falling back to defaults if it is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        let config = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<OrbConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Failed to parse {}: {}; using defaults", path.display(), e);
                    return Self::default();
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };

        if let Err(e) = config.settings.validate() {
            log::warn!("Invalid settings in {}: {}; using defaults", path.display(), e);
            return Self::default();
        }

        log::info!("✓ Loaded {}", path.display());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml() {
        let yaml = "settings:\n  color: 0xff0141\ncapture:\n  duration_ms: 250\nseed: 7\n";
        let cfg: OrbConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.settings.color, 0xff0141);
        assert_eq!(cfg.settings.speed, 3.0);
        assert_eq!(cfg.capture.duration_ms, 250);
        assert_eq!(cfg.capture.target_depth, 1.0);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn test_force_variant_from_yaml() {
        let yaml = "forces:\n  unscaled_attraction: true\n  damping: 0.95\n";
        let cfg: OrbConfig = serde_yaml::from_str(yaml).unwrap();
        let model = cfg.forces.model();
        assert_eq!(model.attraction_scaling, AttractionScaling::Unscaled);
        assert_eq!(model.damping, 0.95);

        assert_eq!(OrbConfig::default().forces.model(), ForceModel::default());
    }

    #[test]
    fn test_load_missing_file() {
        let cfg = OrbConfig::load("/nonexistent/flavor-orb.yaml");
        assert_eq!(cfg, OrbConfig::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let path = std::env::temp_dir().join("flavor-orb-malformed-test.yaml");
        std::fs::write(&path, "settings: [not, a, map]\n").unwrap();
        let cfg = OrbConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(cfg, OrbConfig::default());
    }

    #[test]
    fn test_load_rejects_empty_population() {
        let path = std::env::temp_dir().join("flavor-orb-empty-test.yaml");
        std::fs::write(&path, "settings:\n  particle_count: 0\n").unwrap();
        let cfg = OrbConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(cfg.settings.particle_count, 3000);
    }
}
