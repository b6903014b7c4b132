//! egui overlay drawn on top of the presented frame
//!
//! The app runs egui and tessellates; this side only owns the GPU half. A
//! submitted frame is kept and redrawn by every render until the next submit,
//! so off-cycle renders still show the panel.

use egui_wgpu::ScreenDescriptor;

/// Tessellated egui output for one UI frame
pub struct OverlayFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct Overlay {
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    pixels_per_point: f32,
    /// Freed on the next submit, once the frame that used them is drawn
    pending_free: Vec<egui::TextureId>,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(
                device,
                output_format,
                egui_wgpu::RendererOptions {
                    msaa_samples: 1,
                    depth_stencil_format: None,
                    dithering: false,
                    ..Default::default()
                },
            ),
            paint_jobs: Vec::new(),
            pixels_per_point: 1.0,
            pending_free: Vec::new(),
        }
    }

    pub fn submit(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: OverlayFrame) {
        for id in self.pending_free.drain(..) {
            self.renderer.free_texture(&id);
        }
        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        self.paint_jobs = frame.paint_jobs;
        self.pixels_per_point = frame.pixels_per_point;
        self.pending_free = frame.textures_delta.free;
    }

    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        if self.paint_jobs.is_empty() {
            return;
        }

        let screen = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &self.paint_jobs, &screen);

        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        self.renderer
            .render(&mut render_pass, &self.paint_jobs, &screen);
    }
}
