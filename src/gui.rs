use egui::Context;
use egui_winit::State;
use orb_renderer::OverlayFrame;
use orb_simulation::{
    CapturePhase, Channel, Flavor, Orb, RenderBackend, RunState, SettingsUpdate,
};
use winit::{event::WindowEvent, window::Window};

/// Something the user asked for this frame; applied to the orb after the UI runs
#[derive(Debug, Clone, Copy)]
pub enum UiAction {
    SetFlavor(Flavor, Channel, f32),
    SelectFlavor(Flavor),
    Update(SettingsUpdate),
    Capture,
    TogglePause,
}

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub particle_count: usize,
    /// Slider value; applied when the drag ends
    pub count_slider: usize,
    pub speed: f32,
    pub curl_size: f32,
    pub motion_blur_damp: f32,
    pub bloom_strength: f32,
    pub color: [u8; 3],
    /// `[smell, taste]` per flavor, in `Flavor::ALL` order
    pub intensities: [[f32; 2]; 4],
    pub selected: Option<Flavor>,
    pub capture_phase: CapturePhase,
    pub paused: bool,
    pub last_capture: Option<String>,
    pub actions: Vec<UiAction>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            particle_count: 0,
            count_slider: 0,
            speed: 0.0,
            curl_size: 0.0,
            motion_blur_damp: 0.0,
            bloom_strength: 0.0,
            color: [0; 3],
            intensities: [[1.0; 2]; 4],
            selected: None,
            capture_phase: CapturePhase::Idle,
            paused: false,
            last_capture: None,
            actions: Vec::new(),
        }
    }
}

impl UiState {
    /// Mirror the orb so sliders show values changed elsewhere (e.g. by flavors)
    pub fn sync<B: RenderBackend>(&mut self, orb: &Orb<B>) {
        let settings = orb.settings();
        self.particle_count = settings.particle_count;
        if self.count_slider == 0 {
            self.count_slider = settings.particle_count;
        }
        self.speed = settings.speed;
        self.curl_size = settings.curl_size;
        self.motion_blur_damp = settings.motion_blur_damp;
        self.bloom_strength = settings.bloom_strength;
        self.color = rgb_bytes(settings.color);

        for (slot, flavor) in Flavor::ALL.iter().enumerate() {
            let intensity = orb.flavors().intensity(*flavor);
            self.intensities[slot] = [intensity.smell, intensity.taste];
        }
        self.capture_phase = orb.capture_phase();
        self.paused = orb.run_state() == RunState::Paused;
    }
}

fn rgb_bytes(hex: u32) -> [u8; 3] {
    let [_, r, g, b] = hex.to_be_bytes();
    [r, g, b]
}

pub struct Gui {
    context: Context,
    state: State,
}

impl Gui {
    pub fn new(window: &Window, max_texture_side: usize) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(max_texture_side),
        );

        Self { context, state }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// Run the UI and tessellate it for the renderer
    pub fn run(&mut self, window: &Window, ui_state: &mut UiState) -> OverlayFrame {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        OverlayFrame {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    fn ui(ctx: &Context, state: &mut UiState) {
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Particles: {}", state.particle_count));
            });

        egui::Window::new("Flavors")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                for (slot, flavor) in Flavor::ALL.into_iter().enumerate() {
                    let [r, g, b] = rgb_bytes(flavor.color());
                    let swatch = egui::Color32::from_rgb(r, g, b);

                    ui.horizontal(|ui| {
                        let selected = state.selected == Some(flavor);
                        let label = egui::RichText::new(flavor.name()).color(swatch).strong();
                        if ui.selectable_label(selected, label).clicked() {
                            state.selected = Some(flavor);
                            state.actions.push(UiAction::SelectFlavor(flavor));
                        }
                    });

                    let [smell, taste] = &mut state.intensities[slot];
                    if ui
                        .add(egui::Slider::new(smell, 0.0..=2.0).text("Smell"))
                        .changed()
                    {
                        state
                            .actions
                            .push(UiAction::SetFlavor(flavor, Channel::Smell, *smell));
                    }
                    if ui
                        .add(egui::Slider::new(taste, 0.0..=2.0).text("Taste"))
                        .changed()
                    {
                        state
                            .actions
                            .push(UiAction::SetFlavor(flavor, Channel::Taste, *taste));
                    }
                    ui.separator();
                }
            });

        egui::Window::new("Orb")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let mut update = SettingsUpdate::default();

                ui.heading("Motion");
                if ui
                    .add(egui::Slider::new(&mut state.speed, 0.1..=10.0).text("Speed"))
                    .changed()
                {
                    update = update.with_speed(state.speed);
                }
                if ui
                    .add(egui::Slider::new(&mut state.curl_size, 0.0..=3.0).text("Curl Size"))
                    .changed()
                {
                    update = update.with_curl_size(state.curl_size);
                }
                if ui
                    .add(
                        egui::Slider::new(&mut state.count_slider, 100..=20000)
                            .text("Particles")
                            .logarithmic(true),
                    )
                    .drag_stopped()
                {
                    update = update.with_particle_count(state.count_slider);
                }

                ui.separator();
                ui.heading("Look");
                if ui
                    .add(egui::Slider::new(&mut state.bloom_strength, 0.0..=3.0).text("Bloom"))
                    .changed()
                {
                    update = update.with_bloom_strength(state.bloom_strength);
                }
                if ui
                    .add(
                        egui::Slider::new(&mut state.motion_blur_damp, 0.0..=0.99)
                            .text("Motion Blur"),
                    )
                    .changed()
                {
                    update = update.with_motion_blur_damp(state.motion_blur_damp);
                }
                ui.horizontal(|ui| {
                    ui.label("Color");
                    if egui::color_picker::color_edit_button_srgb(ui, &mut state.color).changed() {
                        let [r, g, b] = state.color;
                        update = update.with_color(u32::from_be_bytes([0, r, g, b]));
                    }
                });

                if update != SettingsUpdate::default() {
                    state.actions.push(UiAction::Update(update));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let label = if state.paused { "Play" } else { "Pause" };
                    if ui.button(label).clicked() {
                        state.actions.push(UiAction::TogglePause);
                    }
                    let idle = state.capture_phase == CapturePhase::Idle;
                    if ui.add_enabled(idle, egui::Button::new("Capture")).clicked() {
                        state.actions.push(UiAction::Capture);
                    }
                });
                if state.capture_phase != CapturePhase::Idle {
                    ui.label(format!("Capturing: {:?}", state.capture_phase));
                } else if let Some(path) = &state.last_capture {
                    ui.label(format!("Saved {}", path));
                }
            });
    }
}
