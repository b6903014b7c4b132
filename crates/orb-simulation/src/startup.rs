//! Bounded wait for a render surface
//!
//! The host may not have a surface ready when the orb is asked to start (a
//! window that has not been created yet, a canvas not yet attached). Startup
//! polls a [`SurfaceSource`] until it produces a backend or the attempt budget
//! runs out.

use crate::backend::RenderBackend;
use crate::config::OrbConfig;
use crate::error::{RenderError, StartupError};
use crate::simulation::Orb;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Delay the host should leave between polls
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_attempts: 50,
        }
    }
}

impl StartupConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Something that can eventually hand over a ready renderer
pub trait SurfaceSource {
    type Backend: RenderBackend;

    /// `None` while the surface does not exist yet
    fn acquire(&mut self) -> Option<Result<Self::Backend, RenderError>>;
}

pub struct Startup<S: SurfaceSource> {
    source: S,
    config: OrbConfig,
    attempts: u32,
}

impl<S: SurfaceSource> Startup<S> {
    pub fn new(source: S, config: OrbConfig) -> Self {
        Self {
            source,
            config,
            attempts: 0,
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.startup.poll_interval()
    }

    /// One attempt. `Ok(None)` means "not yet, poll again later".
    pub fn poll(&mut self) -> Result<Option<Orb<S::Backend>>, StartupError> {
        let max_attempts = self.config.startup.max_attempts;
        if self.attempts >= max_attempts {
            return Err(StartupError::SurfaceUnavailable {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;

        match self.source.acquire() {
            Some(Ok(backend)) => {
                log::info!("✓ Render surface ready after {} attempt(s)", self.attempts);
                let orb = Orb::new(backend, self.config.clone())?;
                Ok(Some(orb))
            }
            Some(Err(e)) => Err(StartupError::Backend(e)),
            None if self.attempts >= max_attempts => {
                log::warn!("Render surface still missing after {} attempts", self.attempts);
                Err(StartupError::SurfaceUnavailable {
                    attempts: self.attempts,
                })
            }
            None => {
                log::debug!("Render surface not ready (attempt {})", self.attempts);
                Ok(None)
            }
        }
    }

    /// Poll on the current thread, sleeping between attempts
    pub fn block(mut self) -> Result<Orb<S::Backend>, StartupError> {
        loop {
            if let Some(orb) = self.poll()? {
                return Ok(orb);
            }
            std::thread::sleep(self.poll_interval());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::RecordingBackend;

    struct DelayedSource {
        ready_after: u32,
        calls: u32,
    }

    impl SurfaceSource for DelayedSource {
        type Backend = RecordingBackend;

        fn acquire(&mut self) -> Option<Result<RecordingBackend, RenderError>> {
            self.calls += 1;
            (self.calls >= self.ready_after).then(|| Ok(RecordingBackend::default()))
        }
    }

    fn config(max_attempts: u32) -> OrbConfig {
        OrbConfig {
            startup: StartupConfig {
                poll_interval_ms: 0,
                max_attempts,
            },
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_waits_then_starts() {
        let source = DelayedSource {
            ready_after: 3,
            calls: 0,
        };
        let mut startup = Startup::new(source, config(5));
        assert!(startup.poll().unwrap().is_none());
        assert!(startup.poll().unwrap().is_none());
        assert!(startup.poll().unwrap().is_some());
        assert_eq!(startup.attempts(), 3);
    }

    #[test]
    fn test_gives_up_after_bound() {
        let source = DelayedSource {
            ready_after: u32::MAX,
            calls: 0,
        };
        let result = Startup::new(source, config(4)).block();
        assert!(matches!(
            result,
            Err(StartupError::SurfaceUnavailable { attempts: 4 })
        ));
    }

    #[test]
    fn test_backend_failure_surfaces() {
        struct Broken;
        impl SurfaceSource for Broken {
            type Backend = RecordingBackend;
            fn acquire(&mut self) -> Option<Result<RecordingBackend, RenderError>> {
                Some(Err(RenderError::Backend("no adapter".into())))
            }
        }

        let result = Startup::new(Broken, config(3)).poll();
        assert!(matches!(result, Err(StartupError::Backend(_))));
    }
}
