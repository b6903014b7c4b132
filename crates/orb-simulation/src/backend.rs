//! Contract with the external renderer
//!
//! The simulation never touches GPU state directly. It hands flat buffers and
//! numeric parameters to a [`RenderBackend`] and asks it to draw, read back,
//! or move the camera.

use crate::error::RenderError;
use crate::settings::BloomParams;
use glam::Vec3;

/// One tick's worth of render input.
///
/// The slices are borrowed from the simulation for the duration of `upload`
/// only; a backend copies what it needs and must not keep them.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    /// `3 * count` xyz floats
    pub positions: &'a [f32],
    /// `3 * count` rgb floats
    pub colors: &'a [f32],
    /// Matches the generation passed with the last `install_geometry`
    pub generation: u64,
    /// Accumulated spin of the cloud about +Y, radians
    pub spin_angle: f32,
}

impl FrameData<'_> {
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Everything the simulation needs from a renderer
pub trait RenderBackend {
    /// Allocate geometry for `particle_count` points.
    /// Called after `release_geometry` on every population resize.
    fn install_geometry(&mut self, particle_count: usize, generation: u64);

    /// Free the current geometry; the next call is `install_geometry`
    fn release_geometry(&mut self);

    /// Copy this tick's buffers (the per-tick "needs update" signal)
    fn upload(&mut self, frame: &FrameData<'_>);

    fn set_bloom(&mut self, bloom: BloomParams);

    /// Afterimage / motion-blur damping
    fn set_afterimage_damp(&mut self, damp: f32);

    /// Draw the current scene to the surface
    fn render(&mut self) -> Result<(), RenderError>;

    /// Read the last rendered frame back as RGBA8
    fn read_pixels(&mut self) -> Result<image::RgbaImage, RenderError>;

    fn camera_position(&self) -> Vec3;

    /// Distance of the camera from its orbit target
    fn camera_depth(&self) -> f32;

    fn set_camera_depth(&mut self, depth: f32);

    /// Tear down the surface. Terminal; called exactly once.
    fn release_surface(&mut self);
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Install(usize, u64),
        Release,
        Upload(usize, u64),
        Bloom(f32),
        Damp(f32),
        Render,
        ReadPixels,
        ReleaseSurface,
    }

    /// Headless backend that records every call
    #[derive(Debug)]
    pub struct RecordingBackend {
        pub calls: Vec<Call>,
        pub depth: f32,
        pub depth_history: Vec<f32>,
        pub fail_readback: bool,
        pub last_colors: Vec<f32>,
        pub last_positions: Vec<f32>,
    }

    impl Default for RecordingBackend {
        fn default() -> Self {
            Self {
                calls: Vec::new(),
                depth: 10.5,
                depth_history: Vec::new(),
                fail_readback: false,
                last_colors: Vec::new(),
                last_positions: Vec::new(),
            }
        }
    }

    impl RecordingBackend {
        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    impl RenderBackend for RecordingBackend {
        fn install_geometry(&mut self, particle_count: usize, generation: u64) {
            self.calls.push(Call::Install(particle_count, generation));
        }

        fn release_geometry(&mut self) {
            self.calls.push(Call::Release);
        }

        fn upload(&mut self, frame: &FrameData<'_>) {
            self.last_positions = frame.positions.to_vec();
            self.last_colors = frame.colors.to_vec();
            self.calls
                .push(Call::Upload(frame.particle_count(), frame.generation));
        }

        fn set_bloom(&mut self, bloom: BloomParams) {
            self.calls.push(Call::Bloom(bloom.strength));
        }

        fn set_afterimage_damp(&mut self, damp: f32) {
            self.calls.push(Call::Damp(damp));
        }

        fn render(&mut self) -> Result<(), RenderError> {
            self.calls.push(Call::Render);
            Ok(())
        }

        fn read_pixels(&mut self) -> Result<image::RgbaImage, RenderError> {
            self.calls.push(Call::ReadPixels);
            if self.fail_readback {
                return Err(RenderError::Readback("mock failure".into()));
            }
            Ok(image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 243, 7, 255])))
        }

        fn camera_position(&self) -> Vec3 {
            Vec3::new(0.0, 0.0, self.depth)
        }

        fn camera_depth(&self) -> f32 {
            self.depth
        }

        fn set_camera_depth(&mut self, depth: f32) {
            self.depth = depth;
            self.depth_history.push(depth);
        }

        fn release_surface(&mut self) {
            self.calls.push(Call::ReleaseSurface);
        }
    }
}
