//! Flavor Orb
//!
//! A glowing particle orb whose motion and color follow smell and taste
//! intensities for four flavors.

mod gui;

use gui::{Gui, UiAction, UiState};
use orb_renderer::OrbRenderer;
use orb_simulation::{
    CaptureHandle, CapturePhase, Orb, OrbConfig, OrbError, RenderError, RunState, Startup,
    SurfaceSource, CONFIG_FILE,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Hands the renderer over once the window exists
struct WindowSource {
    window: Option<Arc<Window>>,
}

impl SurfaceSource for WindowSource {
    type Backend = OrbRenderer;

    fn acquire(&mut self) -> Option<Result<OrbRenderer, RenderError>> {
        let window = self.window.clone()?;
        Some(pollster::block_on(OrbRenderer::new(window)))
    }
}

struct App {
    startup: Option<Startup<WindowSource>>,
    window: Option<Arc<Window>>,
    orb: Option<Orb<OrbRenderer>>,
    gui: Option<Gui>,
    ui_state: UiState,
    pending_capture: Option<CaptureHandle>,

    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,

    last_frame: Instant,
    frame_times: VecDeque<f32>,
}

impl App {
    fn new(config: OrbConfig) -> Self {
        Self {
            startup: Some(Startup::new(WindowSource { window: None }, config)),
            window: None,
            orb: None,
            gui: None,
            ui_state: UiState::default(),
            pending_capture: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            last_frame: Instant::now(),
            frame_times: VecDeque::with_capacity(60),
        }
    }

    /// Try to bring the orb up; exits the loop if the surface never shows
    fn poll_startup(&mut self, event_loop: &ActiveEventLoop) {
        let Some(startup) = &mut self.startup else {
            return;
        };

        match startup.poll() {
            Ok(Some(orb)) => {
                if let Some(window) = &self.window {
                    let max_texture_side = orb.backend().device().limits().max_texture_dimension_2d;
                    self.gui = Some(Gui::new(window, max_texture_side as usize));
                    window.request_redraw();
                }
                self.orb = Some(orb);
                self.startup = None;
                self.last_frame = Instant::now();
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to start: {}", OrbError::from(e));
                event_loop.exit();
            }
        }
    }

    fn apply_actions(&mut self) {
        let Some(orb) = &mut self.orb else {
            return;
        };

        for action in self.ui_state.actions.drain(..) {
            match apply_action(orb, action) {
                Ok(Some(handle)) => self.pending_capture = Some(handle),
                Ok(None) => {}
                Err(e) => log::warn!("Ignoring UI input: {}", e),
            }
        }
    }

    /// Collect a capture once its sequence has wound down
    fn finish_capture(&mut self) {
        let Some(orb) = &self.orb else {
            return;
        };
        if self.pending_capture.is_none() || orb.capture_phase() != CapturePhase::Idle {
            return;
        }
        let Some(handle) = self.pending_capture.take() else {
            return;
        };

        match pollster::block_on(handle.wait()) {
            Ok(artifact) => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                let path = format!("capture-{}.png", secs);
                match std::fs::write(&path, &artifact.png) {
                    Ok(()) => {
                        log::info!("✓ Saved capture to {}", path);
                        log::debug!("  data URI: {} bytes", artifact.to_data_uri().len());
                        self.ui_state.last_capture = Some(path);
                    }
                    Err(e) => log::error!("Failed to write {}: {}", path, e),
                }
            }
            Err(e) => log::warn!("Capture failed: {}", e),
        }
    }

    fn frame_stats(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        if self.frame_times.len() == 60 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = if avg > 0.0 { 1000.0 / avg } else { 0.0 };
        (fps, avg)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (fps, frame_time) = self.frame_stats();
        let (Some(window), Some(orb), Some(gui)) = (&self.window, &mut self.orb, &mut self.gui)
        else {
            return;
        };

        self.ui_state.fps = fps;
        self.ui_state.frame_time = frame_time;
        self.ui_state.sync(orb);
        let overlay = gui.run(window, &mut self.ui_state);
        orb.backend_mut().submit_overlay(overlay);

        self.apply_actions();

        let (Some(window), Some(orb)) = (&self.window, &mut self.orb) else {
            return;
        };
        match orb.tick() {
            Ok(()) => {
                window.set_title(&format!(
                    "Flavor Orb - {:.0} FPS ({:.2}ms) - {} particles",
                    fps,
                    frame_time,
                    orb.settings().particle_count
                ));
            }
            Err(RenderError::SurfaceLost) => {
                let size = window.inner_size();
                orb.backend_mut().resize(size.width, size.height);
            }
            Err(RenderError::OutOfMemory) => event_loop.exit(),
            Err(e) => log::error!("{}", OrbError::from(e)),
        }

        self.finish_capture();
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(orb) = &mut self.orb {
            orb.stop();
        }
        self.pending_capture = None;
        event_loop.exit();
    }
}

/// Apply one UI action; a capture request hands back its handle
fn apply_action(
    orb: &mut Orb<OrbRenderer>,
    action: UiAction,
) -> Result<Option<CaptureHandle>, OrbError> {
    match action {
        UiAction::SetFlavor(flavor, channel, value) => orb.set_flavor(flavor, channel, value)?,
        UiAction::SelectFlavor(flavor) => orb.select_flavor(flavor)?,
        UiAction::Update(update) => orb.update_settings(update)?,
        UiAction::Capture => return Ok(Some(orb.request_capture()?)),
        UiAction::TogglePause => toggle_pause(orb),
    }
    Ok(None)
}

fn toggle_pause(orb: &mut Orb<OrbRenderer>) {
    match orb.run_state() {
        RunState::Running => orb.pause(),
        RunState::Paused => orb.play(),
        RunState::Stopped => {}
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Flavor Orb")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

            match event_loop.create_window(window_attributes) {
                Ok(window) => {
                    let window = Arc::new(window);
                    self.window = Some(window.clone());
                    if let Some(startup) = &mut self.startup {
                        startup.source_mut().window = Some(window);
                    }
                }
                Err(e) => log::warn!("Window not available yet: {}", e),
            }
        }
        self.poll_startup(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(startup) = &self.startup else {
            event_loop.set_control_flow(ControlFlow::Poll);
            return;
        };
        let next = Instant::now() + startup.poll_interval();
        event_loop.set_control_flow(ControlFlow::WaitUntil(next));
        self.poll_startup(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Handle GUI events
        if let (Some(gui), Some(window)) = (&mut self.gui, &self.window) {
            if gui.handle_event(window, &event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.shutdown(event_loop);
                return;
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.ui_state.actions.push(UiAction::TogglePause);
                self.apply_actions();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyS),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.ui_state.actions.push(UiAction::Capture);
                self.apply_actions();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(orb) = &mut self.orb {
                    orb.backend_mut()
                        .resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let (Some(last_pos), Some(orb)) = (self.last_mouse_pos, &mut self.orb) {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        // The capture sequence owns the camera while it runs
                        if !orb.camera_locked() {
                            orb.backend_mut()
                                .camera
                                .rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(orb) = &mut self.orb {
                    if !orb.camera_locked() {
                        let camera = &mut orb.backend_mut().camera;
                        let step = -scroll * camera.distance / 100.0;
                        camera.zoom(step);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting flavor orb...");
    let config = OrbConfig::load(CONFIG_FILE);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
