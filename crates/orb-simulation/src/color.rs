//! Smooth color transitions and the per-particle depth cue

use glam::Vec3;
use orb_physics::{DEPTH_FADE_DISTANCE, MIN_BRIGHTNESS};

/// Smoothing time constant in seconds
pub const COLOR_SMOOTHING: f32 = 0.2;

/// Decode `0xRRGGBB` into `[0, 1]` components
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// Exponential approach from the current color to the latest target.
///
/// The approach rate is frame-rate independent (`dt / COLOR_SMOOTHING` per frame), but it
/// never lands exactly on the target; it just gets arbitrarily close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorInterpolator {
    current: Vec3,
    target: Vec3,
}

impl ColorInterpolator {
    /// Start settled on `hex`
    pub fn new(hex: u32) -> Self {
        let color = rgb_from_hex(hex);
        Self {
            current: color,
            target: color,
        }
    }

    pub fn current(&self) -> Vec3 {
        self.current
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Replace the target; `current` is untouched until the next update
    pub fn set_target(&mut self, hex: u32) {
        self.target = rgb_from_hex(hex);
    }

    /// Step toward the target and return the new current color
    pub fn update(&mut self, dt: f32) -> Vec3 {
        // Clamped so a long frame lands on the target instead of overshooting.
        let t = (dt / COLOR_SMOOTHING).clamp(0.0, 1.0);
        self.current = self.current.lerp(self.target, t);
        self.current
    }
}

/// Dim particles that are far from the camera
pub fn depth_brightness(camera: Vec3, position: Vec3) -> f32 {
    (1.0 - camera.distance(position) / DEPTH_FADE_DISTANCE).clamp(MIN_BRIGHTNESS, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(rgb_from_hex(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rgb_from_hex(0x0000ff), Vec3::new(0.0, 0.0, 1.0));
        let c = rgb_from_hex(0x808080);
        assert!((c.x - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_target_leaves_current() {
        let mut color = ColorInterpolator::new(0xfff307);
        let before = color.current();
        color.set_target(0xff0000);
        assert_eq!(color.target(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(color.current(), before);
    }

    #[test]
    fn test_converges_monotonically() {
        let mut color = ColorInterpolator::new(0x000000);
        color.set_target(0xffffff);
        let mut last = f32::MAX;
        let mut ticks = 0;
        while color.current().distance(color.target()) > 1e-3 {
            color.update(1.0 / 60.0);
            let d = color.current().distance(color.target());
            assert!(d < last);
            last = d;
            ticks += 1;
            assert!(ticks < 200, "did not converge");
        }
    }

    #[test]
    fn test_long_frame_snaps_to_target() {
        let mut color = ColorInterpolator::new(0x000000);
        color.set_target(0x00ff00);
        assert_eq!(color.update(5.0), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_depth_brightness_bounds() {
        assert_eq!(depth_brightness(Vec3::ZERO, Vec3::ZERO), 1.0);
        assert_eq!(depth_brightness(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)), MIN_BRIGHTNESS);
        let mid = depth_brightness(Vec3::new(0.0, 0.0, 7.5), Vec3::ZERO);
        assert!((mid - 0.5).abs() < 1e-6);
    }
}
