//! The orb: particle population, settings, and the per-tick loop
//!
//! One [`Orb::tick`] runs, in order: color smoothing, force integration with
//! in-place respawn, the depth-cued color pass, the upload to the renderer,
//! and the render itself, with the capture sequence wrapped around the render.

use crate::backend::{FrameData, RenderBackend};
use crate::capture::{CaptureHandle, CapturePhase, CaptureSequencer};
use crate::color::{depth_brightness, ColorInterpolator};
use crate::config::OrbConfig;
use crate::error::{CaptureError, RenderError, SettingsError};
use crate::flavor::{Channel, Flavor, FlavorMapping, FlavorTarget};
use crate::reactive::ReactiveSettings;
use crate::settings::{ensure_finite, Settings, SettingsUpdate};
use orb_physics::{ForceModel, Lifecycle, ParticleState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::TAU;
use std::time::Instant;

/// Longest step a single tick may integrate, in seconds
pub const MAX_FRAME_DT: f32 = 0.25;

/// Clamp a wall-clock delta into something the integrator can take
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt < 0.0 {
        0.0
    } else {
        dt.min(MAX_FRAME_DT)
    }
}

/// Wall-clock source for `dt` and the shared turbulence time
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            last: now,
        }
    }
}

impl FrameClock {
    /// Forget the time spent paused so the next tick does not jump
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// `(dt, time)` in seconds
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        (dt, now.duration_since(self.origin).as_secs_f32())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Stopped,
}

/// A running particle orb bound to one render backend
pub struct Orb<B: RenderBackend> {
    backend: B,
    settings: Settings,
    state: ParticleState,
    forces: ForceModel,
    lifecycle: Lifecycle,
    color: ColorInterpolator,
    flavors: FlavorMapping,
    capture: CaptureSequencer,
    rng: StdRng,
    clock: FrameClock,
    /// Simulated seconds since start; drives the capture timeline
    elapsed: f64,
    spin_angle: f32,
    run_state: RunState,
}

impl<B: RenderBackend> Orb<B> {
    pub fn new(mut backend: B, config: OrbConfig) -> Result<Self, SettingsError> {
        let settings = config.settings;
        settings.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let lifecycle = Lifecycle::default();
        let mut state = ParticleState::with_count(settings.particle_count);
        lifecycle.initialize_all(&mut state, &settings.spawn_params(), &mut rng);

        backend.install_geometry(state.len(), state.generation());
        backend.set_bloom(settings.bloom());
        backend.set_afterimage_damp(settings.motion_blur_damp);

        log::info!("✓ Orb started with {} particles", state.len());

        Ok(Self {
            backend,
            color: ColorInterpolator::new(settings.color),
            flavors: FlavorMapping::new(&settings),
            capture: CaptureSequencer::new(config.capture),
            forces: config.forces.model(),
            settings,
            state,
            lifecycle,
            rng,
            clock: FrameClock::default(),
            elapsed: 0.0,
            spin_angle: 0.0,
            run_state: RunState::Running,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Typed setters with their side effects
    pub fn settings_mut(&mut self) -> ReactiveSettings<'_, B> {
        ReactiveSettings {
            settings: &mut self.settings,
            state: &mut self.state,
            color: &mut self.color,
            backend: &mut self.backend,
            lifecycle: &self.lifecycle,
            rng: &mut self.rng,
            stopped: self.run_state == RunState::Stopped,
        }
    }

    pub fn particles(&self) -> &ParticleState {
        &self.state
    }

    pub fn color(&self) -> &ColorInterpolator {
        &self.color
    }

    pub fn flavors(&self) -> &FlavorMapping {
        &self.flavors
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn capture_phase(&self) -> CapturePhase {
        self.capture.phase()
    }

    /// User camera input must be ignored while this is true
    pub fn camera_locked(&self) -> bool {
        self.capture.is_active()
    }

    /// Merge a partial update. Nothing is written unless every value is valid.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        self.ensure_live()?;
        let update = update.effective();
        update.validate()?;

        let mut settings = self.settings_mut();
        if let Some(color) = update.color {
            settings.set_color(color)?;
        }
        if let Some(speed) = update.speed {
            settings.set_speed(speed)?;
        }
        if let Some(curl_size) = update.curl_size {
            settings.set_curl_size(curl_size)?;
        }
        if let Some(damp) = update.motion_blur_damp {
            settings.set_motion_blur_damp(damp)?;
        }
        if let Some(strength) = update.bloom_strength {
            settings.set_bloom_strength(strength)?;
        }
        if let Some(count) = update.particle_count {
            settings.set_particle_count(count)?;
        }
        Ok(())
    }

    /// Set one flavor channel and push the mapped value through its setter
    pub fn set_flavor(&mut self, flavor: Flavor, channel: Channel, value: f32) -> Result<(), SettingsError> {
        self.ensure_live()?;
        ensure_finite("flavor_intensity", value)?;
        let write = self.flavors.set(flavor, channel, value);
        log::debug!("{} {:?} = {:.2} -> {:?} {:.4}", flavor.name(), channel, value, write.target, write.value);

        let mut settings = self.settings_mut();
        match write.target {
            FlavorTarget::Speed => settings.set_speed(write.value),
            FlavorTarget::Attraction => settings.set_attraction(write.value),
            FlavorTarget::SwirlForce => settings.set_swirl_force(write.value),
            FlavorTarget::MotionBlurDamp => settings.set_motion_blur_damp(write.value),
        }
    }

    fn ensure_live(&self) -> Result<(), SettingsError> {
        if self.run_state == RunState::Stopped {
            return Err(SettingsError::Stopped);
        }
        Ok(())
    }

    /// Fade the particles toward a flavor's signature color
    pub fn select_flavor(&mut self, flavor: Flavor) -> Result<(), SettingsError> {
        self.settings_mut().set_color(flavor.color())
    }

    pub fn request_capture(&mut self) -> Result<CaptureHandle, CaptureError> {
        if self.run_state == RunState::Stopped {
            return Err(CaptureError::Aborted);
        }
        self.capture
            .request(self.elapsed, self.backend.camera_depth())
    }

    /// Resume animating. Has no effect once stopped.
    pub fn play(&mut self) {
        match self.run_state {
            RunState::Paused => {
                self.clock.reset();
                self.run_state = RunState::Running;
                log::info!("Animation resumed");
            }
            RunState::Running => {}
            RunState::Stopped => log::warn!("Cannot resume a stopped orb"),
        }
    }

    /// Freeze the particles; rendering and captures continue
    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
            log::info!("Animation paused");
        }
    }

    /// Terminal. Aborts any capture and releases the surface exactly once.
    pub fn stop(&mut self) {
        if self.run_state == RunState::Stopped {
            return;
        }
        self.capture.abort(&mut self.backend);
        self.backend.release_surface();
        self.run_state = RunState::Stopped;
        log::info!("Orb stopped");
    }

    /// One frame using the wall clock
    pub fn tick(&mut self) -> Result<(), RenderError> {
        let (dt, time) = self.clock.tick();
        self.advance(dt, time)
    }

    /// One frame with an explicit `dt` and turbulence `time`
    pub fn advance(&mut self, dt: f32, time: f32) -> Result<(), RenderError> {
        if self.run_state == RunState::Stopped {
            return Err(RenderError::SurfaceReleased);
        }

        let dt = sanitize_dt(dt);
        self.elapsed += f64::from(dt);

        if self.run_state == RunState::Running {
            self.step(dt, time);
        }

        if self.state.is_dirty() {
            let frame = FrameData {
                positions: self.state.positions(),
                colors: self.state.colors(),
                generation: self.state.generation(),
                spin_angle: self.spin_angle,
            };
            self.backend.upload(&frame);
            self.state.mark_clean();
        }

        self.capture.before_render(&mut self.backend, self.elapsed);
        let rendered = self.backend.render();
        if let Err(e) = &rendered {
            log::warn!("Render failed: {}", e);
        }
        self.capture
            .after_render(&mut self.backend, rendered.is_ok());
        rendered
    }

    fn step(&mut self, dt: f32, time: f32) {
        let color = self.color.update(dt);
        self.spin_angle = (self.spin_angle + self.settings.spin_speed * dt).rem_euclid(TAU);

        let params = self.settings.force_params();
        let spawn = self.settings.spawn_params();
        let camera = self.backend.camera_position();

        let (particles, positions, colors) = self.state.parts_mut();
        for (i, particle) in particles.iter_mut().enumerate() {
            let slot = i * 3..i * 3 + 3;
            self.forces.step(particle, &params, dt, time, i);
            if self.lifecycle.needs_respawn(particle) {
                self.lifecycle
                    .initialize_one(particle, &mut colors[slot.clone()], &spawn, &mut self.rng);
            }
            positions[slot.clone()].copy_from_slice(&particle.position.to_array());

            let brightness = depth_brightness(camera, particle.position);
            colors[slot].copy_from_slice(&(color * brightness).to_array());
        }
    }
}
