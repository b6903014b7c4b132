//! Zoom-in / snapshot / zoom-out capture sequence
//!
//! A capture spans many ticks. The sequencer is driven twice per tick: once
//! before the frame is rendered (to place the camera) and once after (to read
//! the frame back or finish). The caller gets a [`CaptureHandle`] that resolves
//! when the camera is back where it started.

use crate::backend::RenderBackend;
use crate::error::CaptureError;
use futures_intrusive::channel::shared::{oneshot_channel, OneshotReceiver, OneshotSender};
use serde::Deserialize;
use std::io::Cursor;

type CaptureResult = Result<CaptureArtifact, CaptureError>;

/// Timing and framing of a capture
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera depth at the moment the frame is taken
    pub target_depth: f32,
    /// Length of each zoom leg in milliseconds
    pub duration_ms: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_depth: 1.0,
            duration_ms: 1000,
        }
    }
}

impl CaptureConfig {
    fn duration_secs(&self) -> f64 {
        f64::from(self.duration_ms) / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    ZoomIn,
    Captured,
    ZoomOut,
}

/// PNG-encoded still
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    pub png: Vec<u8>,
}

impl CaptureArtifact {
    /// Encode an RGBA frame as PNG
    pub fn encode(frame: &image::RgbaImage) -> Result<Self, CaptureError> {
        let mut png = Vec::new();
        frame.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Self { png })
    }

    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> String {
        use base64::Engine;

        let mut uri = String::from("data:image/png;base64,");
        base64::engine::general_purpose::STANDARD.encode_string(&self.png, &mut uri);
        uri
    }
}

/// Awaitable result of [`CaptureSequencer::request`]
pub struct CaptureHandle {
    receiver: OneshotReceiver<CaptureResult>,
}

impl CaptureHandle {
    /// Resolves once the sequence finishes. A sequencer that goes away first
    /// yields [`CaptureError::Aborted`].
    pub async fn wait(self) -> CaptureResult {
        self.receiver
            .receive()
            .await
            .unwrap_or(Err(CaptureError::Aborted))
    }
}

struct ActiveCapture {
    start: f64,
    original_depth: f32,
    progress: f32,
    artifact: Option<CaptureArtifact>,
    sender: OneshotSender<CaptureResult>,
}

impl ActiveCapture {
    fn resolve(self, result: CaptureResult) {
        // The receiver may already be gone; nobody is left to tell.
        let _ = self.sender.send(result);
    }
}

/// Drives a single in-flight capture at a time
pub struct CaptureSequencer {
    config: CaptureConfig,
    phase: CapturePhase,
    active: Option<ActiveCapture>,
}

impl CaptureSequencer {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            phase: CapturePhase::Idle,
            active: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != CapturePhase::Idle
    }

    /// Start a capture from the camera's current depth
    pub fn request(&mut self, now: f64, camera_depth: f32) -> Result<CaptureHandle, CaptureError> {
        if self.is_active() {
            return Err(CaptureError::InProgress);
        }

        let (sender, receiver) = oneshot_channel();
        self.active = Some(ActiveCapture {
            start: now,
            original_depth: camera_depth,
            progress: 0.0,
            artifact: None,
            sender,
        });
        self.phase = CapturePhase::ZoomIn;
        log::info!("Capture started at depth {:.2}", camera_depth);

        Ok(CaptureHandle { receiver })
    }

    fn progress(&self, start: f64, now: f64) -> f32 {
        let duration = self.config.duration_secs();
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - start) / duration).clamp(0.0, 1.0) as f32
    }

    /// Place the camera for this tick's frame
    pub fn before_render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, now: f64) {
        let target = self.config.target_depth;
        let Some(start) = self.active.as_ref().map(|a| a.start) else {
            return;
        };

        match self.phase {
            CapturePhase::Idle => {}
            CapturePhase::ZoomIn => {
                let t = self.progress(start, now);
                if let Some(active) = self.active.as_mut() {
                    active.progress = t;
                    backend.set_camera_depth(lerp(active.original_depth, target, t));
                }
            }
            CapturePhase::Captured => {
                if let Some(active) = self.active.as_mut() {
                    active.start = now;
                    active.progress = 0.0;
                    backend.set_camera_depth(target);
                }
                self.phase = CapturePhase::ZoomOut;
                log::debug!("Capture zooming out");
            }
            CapturePhase::ZoomOut => {
                let t = self.progress(start, now);
                if let Some(active) = self.active.as_mut() {
                    active.progress = t;
                    backend.set_camera_depth(lerp(target, active.original_depth, t));
                }
            }
        }
    }

    /// Read back or finish once a leg is complete.
    ///
    /// `rendered` is false when this tick's render failed; the snapshot is then
    /// retried on the next tick instead of reading a stale frame.
    pub fn after_render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, rendered: bool) {
        let done = self.active.as_ref().is_some_and(|a| a.progress >= 1.0);
        if !done {
            return;
        }

        match self.phase {
            CapturePhase::ZoomIn if rendered => {
                let snapshot = backend
                    .read_pixels()
                    .map_err(CaptureError::from)
                    .and_then(|frame| CaptureArtifact::encode(&frame));
                match snapshot {
                    Ok(artifact) => {
                        log::info!("Capture taken ({} bytes)", artifact.png.len());
                        if let Some(active) = self.active.as_mut() {
                            active.artifact = Some(artifact);
                        }
                        self.phase = CapturePhase::Captured;
                    }
                    Err(e) => {
                        log::warn!("Capture failed: {}", e);
                        self.finish(backend, Err(e));
                    }
                }
            }
            CapturePhase::ZoomOut => {
                let artifact = self.active.as_mut().and_then(|a| a.artifact.take());
                let result = artifact.ok_or(CaptureError::Aborted);
                self.finish(backend, result);
                log::info!("Capture complete");
            }
            _ => {}
        }
    }

    /// Restore the camera and resolve the awaiting handle
    fn finish<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, result: CaptureResult) {
        if let Some(active) = self.active.take() {
            backend.set_camera_depth(active.original_depth);
            active.resolve(result);
        }
        self.phase = CapturePhase::Idle;
    }

    /// Drop any in-flight capture and put the camera back; its handle
    /// resolves with `Aborted`
    pub fn abort<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.active.is_some() {
            log::warn!("Capture aborted in phase {:?}", self.phase);
        }
        self.finish(backend, Err(CaptureError::Aborted));
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Call, RecordingBackend};

    fn run_to_idle(seq: &mut CaptureSequencer, backend: &mut RecordingBackend, dt: f64) -> Vec<CapturePhase> {
        let mut phases = vec![seq.phase()];
        let mut now = 0.0;
        for _ in 0..1000 {
            now += dt;
            seq.before_render(backend, now);
            seq.after_render(backend, true);
            if phases.last() != Some(&seq.phase()) {
                phases.push(seq.phase());
            }
            if !seq.is_active() {
                break;
            }
        }
        phases
    }

    #[test]
    fn test_full_walk_restores_depth() {
        let mut backend = RecordingBackend::default();
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let handle = seq.request(0.0, backend.depth).unwrap();

        let phases = run_to_idle(&mut seq, &mut backend, 0.1);
        assert_eq!(
            phases,
            vec![
                CapturePhase::ZoomIn,
                CapturePhase::Captured,
                CapturePhase::ZoomOut,
                CapturePhase::Idle
            ]
        );
        assert_eq!(backend.depth, 10.5);
        assert_eq!(backend.count(|c| *c == Call::ReadPixels), 1);

        let artifact = pollster::block_on(handle.wait()).unwrap();
        assert!(artifact.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_snapshot_taken_at_target_depth() {
        let mut backend = RecordingBackend::default();
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let _handle = seq.request(0.0, backend.depth).unwrap();

        let mut now = 0.0;
        let mut snapshot_depth = None;
        while seq.is_active() {
            now += 0.1;
            seq.before_render(&mut backend, now);
            let reads = backend.count(|c| *c == Call::ReadPixels);
            seq.after_render(&mut backend, true);
            if backend.count(|c| *c == Call::ReadPixels) > reads {
                snapshot_depth = Some(backend.depth);
            }
        }
        assert_eq!(snapshot_depth, Some(1.0));

        // Descend to the target, then climb back in bounded steps
        let history = &backend.depth_history;
        let bottom = history.iter().position(|&d| d == 1.0).unwrap();
        let (zoom_in, zoom_out) = history.split_at(bottom + 1);
        assert!(zoom_in.windows(2).all(|w| w[1] < w[0]));
        assert!(zoom_out.windows(2).all(|w| w[1] >= w[0]));
        assert!(zoom_out.windows(2).all(|w| w[1] - w[0] <= 0.95 + 1e-3));
        assert_eq!(zoom_out.last(), Some(&10.5));
    }

    #[test]
    fn test_zoom_in_reaches_target() {
        let mut backend = RecordingBackend::default();
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let _handle = seq.request(0.0, backend.depth).unwrap();

        seq.before_render(&mut backend, 0.5);
        assert!((backend.depth - 5.75).abs() < 1e-5);
        seq.before_render(&mut backend, 2.0);
        assert_eq!(backend.depth, 1.0);
    }

    #[test]
    fn test_overlapping_request_rejected() {
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let _first = seq.request(0.0, 10.0).unwrap();
        assert!(matches!(seq.request(0.1, 10.0), Err(CaptureError::InProgress)));
    }

    #[test]
    fn test_abort_resolves_handle() {
        let mut backend = RecordingBackend::default();
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let handle = seq.request(0.0, backend.depth).unwrap();
        seq.before_render(&mut backend, 0.3);
        assert!(backend.depth < 10.5);
        seq.abort(&mut backend);

        assert_eq!(seq.phase(), CapturePhase::Idle);
        assert_eq!(backend.depth, 10.5);
        assert!(matches!(pollster::block_on(handle.wait()), Err(CaptureError::Aborted)));
    }

    #[test]
    fn test_readback_failure_resolves_with_error() {
        let mut backend = RecordingBackend {
            fail_readback: true,
            ..Default::default()
        };
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let handle = seq.request(0.0, backend.depth).unwrap();
        run_to_idle(&mut seq, &mut backend, 0.25);

        assert!(!seq.is_active());
        assert_eq!(backend.depth, 10.5);
        assert!(matches!(
            pollster::block_on(handle.wait()),
            Err(CaptureError::Render(_))
        ));
    }

    #[test]
    fn test_failed_render_delays_snapshot() {
        let mut backend = RecordingBackend::default();
        let mut seq = CaptureSequencer::new(CaptureConfig::default());
        let _handle = seq.request(0.0, backend.depth).unwrap();

        seq.before_render(&mut backend, 1.5);
        seq.after_render(&mut backend, false);
        assert_eq!(seq.phase(), CapturePhase::ZoomIn);

        seq.before_render(&mut backend, 1.6);
        seq.after_render(&mut backend, true);
        assert_eq!(seq.phase(), CapturePhase::Captured);
    }

    #[test]
    fn test_data_uri_prefix() {
        let frame = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let artifact = CaptureArtifact::encode(&frame).unwrap();
        let uri = artifact.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBOR"));
    }
}
