//! Error types for the orb simulation.
//!
//! Settings writes, renderer calls, captures and startup each have their own
//! error enum; [`OrbError`] wraps them for callers that do not care which
//! layer failed.

use std::fmt;

/// Rejected settings writes.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// A float field was NaN or infinite.
    NonFinite { field: &'static str, value: f32 },
    /// `particle_count` of zero.
    EmptyPopulation,
    /// The orb was stopped; settings no longer reach the renderer.
    Stopped,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::NonFinite { field, value } => {
                write!(f, "Setting `{}` must be finite, got {}", field, value)
            }
            SettingsError::EmptyPopulation => write!(f, "Particle count must be at least 1"),
            SettingsError::Stopped => write!(f, "Orb is stopped"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Failures reported by a [`crate::RenderBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The surface was lost or outdated and needs reconfiguring.
    SurfaceLost,
    /// The GPU ran out of memory.
    OutOfMemory,
    /// The surface has already been released.
    SurfaceReleased,
    /// Reading the rendered frame back to the CPU failed.
    Readback(String),
    /// Anything else the backend wants to report.
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Render surface lost"),
            RenderError::OutOfMemory => write!(f, "Renderer out of memory"),
            RenderError::SurfaceReleased => write!(f, "Render surface already released"),
            RenderError::Readback(msg) => write!(f, "Failed to read back frame: {}", msg),
            RenderError::Backend(msg) => write!(f, "Renderer error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Why a capture did not produce an image.
#[derive(Debug)]
pub enum CaptureError {
    /// Another capture is still running.
    InProgress,
    /// The frame could not be rendered or read back.
    Render(RenderError),
    /// The read-back pixels could not be encoded as PNG.
    Encode(image::ImageError),
    /// The simulation stopped before the capture finished.
    Aborted,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InProgress => write!(f, "A capture is already in progress"),
            CaptureError::Render(e) => write!(f, "Capture render failed: {}", e),
            CaptureError::Encode(e) => write!(f, "Failed to encode capture: {}", e),
            CaptureError::Aborted => write!(f, "Capture aborted before completion"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Render(e) => Some(e),
            CaptureError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderError> for CaptureError {
    fn from(e: RenderError) -> Self {
        CaptureError::Render(e)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::Encode(e)
    }
}

/// Startup could not obtain a render surface.
#[derive(Debug)]
pub enum StartupError {
    /// Still no surface after the configured number of polls.
    SurfaceUnavailable { attempts: u32 },
    /// The surface exists but the backend failed to initialize on it.
    Backend(RenderError),
    /// The configured settings cannot start a simulation.
    Settings(SettingsError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::SurfaceUnavailable { attempts } => {
                write!(f, "Render surface unavailable after {} attempts", attempts)
            }
            StartupError::Backend(e) => write!(f, "Failed to initialize renderer: {}", e),
            StartupError::Settings(e) => write!(f, "Invalid startup settings: {}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Backend(e) => Some(e),
            StartupError::Settings(e) => Some(e),
            StartupError::SurfaceUnavailable { .. } => None,
        }
    }
}

impl From<SettingsError> for StartupError {
    fn from(e: SettingsError) -> Self {
        StartupError::Settings(e)
    }
}

impl From<RenderError> for StartupError {
    fn from(e: RenderError) -> Self {
        StartupError::Backend(e)
    }
}

/// Any error the orb can produce.
#[derive(Debug)]
pub enum OrbError {
    Settings(SettingsError),
    Render(RenderError),
    Capture(CaptureError),
    Startup(StartupError),
}

impl fmt::Display for OrbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbError::Settings(e) => write!(f, "Settings error: {}", e),
            OrbError::Render(e) => write!(f, "{}", e),
            OrbError::Capture(e) => write!(f, "{}", e),
            OrbError::Startup(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OrbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrbError::Settings(e) => Some(e),
            OrbError::Render(e) => Some(e),
            OrbError::Capture(e) => Some(e),
            OrbError::Startup(e) => Some(e),
        }
    }
}

impl From<SettingsError> for OrbError {
    fn from(e: SettingsError) -> Self {
        OrbError::Settings(e)
    }
}

impl From<RenderError> for OrbError {
    fn from(e: RenderError) -> Self {
        OrbError::Render(e)
    }
}

impl From<CaptureError> for OrbError {
    fn from(e: CaptureError) -> Self {
        OrbError::Capture(e)
    }
}

impl From<StartupError> for OrbError {
    fn from(e: StartupError) -> Self {
        OrbError::Startup(e)
    }
}
