//! Orbit camera around the orb

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// View * cloud spin
    pub model_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Sprite diameter in world units
    pub point_size: f32,
    pub _padding: [f32; 3],
}

/// Orbit camera; `distance` is the depth driven by captures
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub const DEFAULT_DISTANCE: f32 = 10.5;
    pub const MIN_DISTANCE: f32 = 0.5;
    pub const MAX_DISTANCE: f32 = 50.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: Self::DEFAULT_DISTANCE,
            rotation: Quat::IDENTITY,
            target: Vec3::ZERO,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: 50.0_f32.to_radians(),
            znear: 0.1,
            zfar: 2000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = (yaw_rotation * pitch_rotation * self.rotation).normalize();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    /// Set the depth directly, without the user zoom limits
    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() && distance > 0.0 {
            self.distance = distance;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position());
        rotation_matrix * translation_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn to_uniform(&self, spin_angle: f32, point_size: f32) -> CameraUniform {
        let model = Mat4::from_rotation_y(spin_angle);
        CameraUniform {
            model_view: (self.view_matrix() * model).to_cols_array_2d(),
            proj: self.projection_matrix().to_cols_array_2d(),
            point_size,
            _padding: [0.0; 3],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_on_z() {
        let camera = Camera::new(1920, 1080);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 10.5)).length() < 1e-6);
    }

    #[test]
    fn test_origin_in_front_of_camera() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        let origin = view.transform_point3(Vec3::ZERO);
        assert!((origin.z + camera.distance).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_keeps_distance() {
        let mut camera = Camera::new(800, 600);
        camera.rotate(0.7, -0.3);
        assert!((camera.position().length() - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_clamped_but_set_distance_is_not() {
        let mut camera = Camera::new(800, 600);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, Camera::MIN_DISTANCE);
        camera.set_distance(0.25);
        assert_eq!(camera.distance, 0.25);
        camera.set_distance(f32::NAN);
        assert_eq!(camera.distance, 0.25);
    }
}
