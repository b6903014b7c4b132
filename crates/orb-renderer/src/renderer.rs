//! wgpu implementation of the orb's render backend
//!
//! Each frame goes through three passes:
//! 1. particles are drawn additively into an offscreen scene texture,
//! 2. bloom and the afterimage are composited into one of two history
//!    textures (ping-pong, the other one holds the previous frame),
//! 3. the fresh history texture is blitted to the surface, with the egui
//!    overlay on top.
//!
//! Captures read back the history texture, so they never include the UI.

use crate::camera::Camera;
use crate::overlay::{Overlay, OverlayFrame};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use orb_simulation::{BloomParams, FrameData, RenderBackend, RenderError, Settings};
use std::sync::Arc;
use winit::window::Window;

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Sprite diameter in world units
const POINT_SIZE: f32 = 0.12;

const ADDITIVE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PostUniform {
    texel_size: [f32; 2],
    damp: f32,
    bloom_strength: f32,
    bloom_radius: f32,
    bloom_threshold: f32,
    _padding: [f32; 2],
}

/// Per-population GPU buffers, replaced wholesale on resize
struct Geometry {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
    generation: u64,
}

/// Size-dependent textures and the bind groups that sample them
struct Targets {
    scene_view: wgpu::TextureView,
    history: [wgpu::Texture; 2],
    composite_groups: [wgpu::BindGroup; 2],
    present_groups: [wgpu::BindGroup; 2],
    width: u32,
    height: u32,
}

pub struct OrbRenderer {
    surface: Option<wgpu::Surface<'static>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pub camera: Camera,
    camera_buffer: wgpu::Buffer,
    post_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,

    particle_layout: wgpu::BindGroupLayout,
    particle_pipeline: wgpu::RenderPipeline,
    post_layout: wgpu::BindGroupLayout,
    composite_pipeline: wgpu::RenderPipeline,
    present_pipeline: wgpu::RenderPipeline,

    targets: Targets,
    /// History slot holding the last composited frame
    current: usize,
    geometry: Option<Geometry>,
    overlay: Overlay,

    spin_angle: f32,
    bloom: BloomParams,
    damp: f32,
}

impl OrbRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        // The composite already holds display values; a linear surface shows
        // exactly what a capture reads back.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<crate::camera::CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let post_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post Buffer"),
            size: std::mem::size_of::<PostUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let (particle_layout, particle_pipeline) = create_particle_pipeline(&device);
        let post_layout = create_post_layout(&device);
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Post Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/post.wgsl").into()),
        });
        let composite_pipeline = create_post_pipeline(
            &device,
            &post_layout,
            &post_shader,
            "fs_composite",
            OFFSCREEN_FORMAT,
        );
        let present_pipeline = create_post_pipeline(
            &device,
            &post_layout,
            &post_shader,
            "fs_present",
            surface_format,
        );

        let targets = Targets::new(
            &device,
            &post_layout,
            &sampler,
            &post_buffer,
            config.width,
            config.height,
        );
        let overlay = Overlay::new(&device, surface_format);
        let defaults = Settings::default();

        Ok(Self {
            surface: Some(surface),
            camera: Camera::new(config.width, config.height),
            device,
            queue,
            config,
            camera_buffer,
            post_buffer,
            sampler,
            particle_layout,
            particle_pipeline,
            post_layout,
            composite_pipeline,
            present_pipeline,
            targets,
            current: 0,
            geometry: None,
            overlay,
            spin_angle: 0.0,
            bloom: defaults.bloom(),
            damp: defaults.motion_blur_damp,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
        self.camera.resize(width, height);
        self.targets = Targets::new(
            &self.device,
            &self.post_layout,
            &self.sampler,
            &self.post_buffer,
            width,
            height,
        );
        self.current = 0;
    }

    /// Replace the UI drawn over every following frame
    pub fn submit_overlay(&mut self, frame: OverlayFrame) {
        self.overlay.submit(&self.device, &self.queue, frame);
    }

    fn post_uniform(&self) -> PostUniform {
        PostUniform {
            texel_size: [
                1.0 / self.targets.width as f32,
                1.0 / self.targets.height as f32,
            ],
            damp: self.damp,
            bloom_strength: self.bloom.strength,
            bloom_radius: self.bloom.radius,
            bloom_threshold: self.bloom.threshold,
            _padding: [0.0; 2],
        }
    }

    fn acquire(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        let surface = self.surface.as_ref().ok_or(RenderError::SurfaceReleased)?;
        match surface.get_current_texture() {
            Ok(output) => Ok(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(&self.device, &self.config);
                Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(RenderError::OutOfMemory),
            Err(e) => Err(RenderError::Backend(e.to_string())),
        }
    }
}

/// Instance count for one draw call, if it fits
fn instance_count(particle_count: usize) -> Option<u32> {
    u32::try_from(particle_count).ok()
}

impl RenderBackend for OrbRenderer {
    fn install_geometry(&mut self, particle_count: usize, generation: u64) {
        let Some(count) = instance_count(particle_count) else {
            log::error!("Cannot draw {} particles in one instanced call", particle_count);
            return;
        };
        // Storage bindings may not be empty
        let size = (particle_count.max(1) * 3 * std::mem::size_of::<f32>()) as u64;
        let create = |label: &str| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let positions = create("Position Buffer");
        let colors = create("Color Buffer");

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &self.particle_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: positions.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors.as_entire_binding(),
                },
            ],
        });

        self.geometry = Some(Geometry {
            positions,
            colors,
            bind_group,
            count,
            generation,
        });
        log::debug!("Installed geometry for {} particles (generation {})", particle_count, generation);
    }

    fn release_geometry(&mut self) {
        if let Some(geometry) = self.geometry.take() {
            geometry.positions.destroy();
            geometry.colors.destroy();
        }
    }

    fn upload(&mut self, frame: &FrameData<'_>) {
        self.spin_angle = frame.spin_angle;
        let Some(geometry) = &self.geometry else {
            log::warn!("Upload without installed geometry");
            return;
        };
        if geometry.generation != frame.generation || geometry.count as usize != frame.particle_count() {
            log::warn!(
                "Skipping upload for generation {} ({} particles); installed generation {} ({})",
                frame.generation,
                frame.particle_count(),
                geometry.generation,
                geometry.count
            );
            return;
        }
        self.queue
            .write_buffer(&geometry.positions, 0, bytemuck::cast_slice(frame.positions));
        self.queue
            .write_buffer(&geometry.colors, 0, bytemuck::cast_slice(frame.colors));
    }

    fn set_bloom(&mut self, bloom: BloomParams) {
        self.bloom = bloom;
    }

    fn set_afterimage_damp(&mut self, damp: f32) {
        self.damp = damp;
    }

    fn render(&mut self) -> Result<(), RenderError> {
        let output = self.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.to_uniform(self.spin_angle, POINT_SIZE)]),
        );
        self.queue
            .write_buffer(&self.post_buffer, 0, bytemuck::bytes_of(&self.post_uniform()));

        let next = 1 - self.current;
        let history_view = self.targets.history[next].create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Orb Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(geometry) = &self.geometry {
                render_pass.set_pipeline(&self.particle_pipeline);
                render_pass.set_bind_group(0, &geometry.bind_group, &[]);
                render_pass.draw(0..6, 0..geometry.count);
            }
        }

        fullscreen_pass(
            &mut encoder,
            "Composite Pass",
            &history_view,
            &self.composite_pipeline,
            &self.targets.composite_groups[next],
        );
        fullscreen_pass(
            &mut encoder,
            "Present Pass",
            &view,
            &self.present_pipeline,
            &self.targets.present_groups[next],
        );

        self.overlay.draw(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            [self.config.width, self.config.height],
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.current = next;
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<image::RgbaImage, RenderError> {
        let (width, height) = (self.targets.width, self.targets.height);
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.targets.history[self.current],
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        staging.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Readback("pixel buffer size mismatch".into()))
    }

    fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    fn camera_depth(&self) -> f32 {
        self.camera.distance
    }

    fn set_camera_depth(&mut self, depth: f32) {
        self.camera.set_distance(depth);
    }

    fn release_surface(&mut self) {
        self.release_geometry();
        if self.surface.take().is_some() {
            log::info!("Render surface released");
        }
    }
}

impl Targets {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        post_buffer: &wgpu::Buffer,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = |label: &str, usage: wgpu::TextureUsages| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: OFFSCREEN_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING | usage,
                view_formats: &[],
            })
        };

        let scene = texture("Scene Texture", wgpu::TextureUsages::empty());
        let history = [
            texture("History Texture A", wgpu::TextureUsages::COPY_SRC),
            texture("History Texture B", wgpu::TextureUsages::COPY_SRC),
        ];

        let scene_view = scene.create_view(&wgpu::TextureViewDescriptor::default());
        let history_views = [
            history[0].create_view(&wgpu::TextureViewDescriptor::default()),
            history[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        let bind_group = |label: &str, current: &wgpu::TextureView, previous: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(current),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(previous),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: post_buffer.as_entire_binding(),
                    },
                ],
            })
        };

        // Composite into slot i reads the other slot as the previous frame
        let composite_groups = [
            bind_group("Composite Bind Group A", &scene_view, &history_views[1]),
            bind_group("Composite Bind Group B", &scene_view, &history_views[0]),
        ];
        let present_groups = [
            bind_group("Present Bind Group A", &history_views[0], &history_views[0]),
            bind_group("Present Bind Group B", &history_views[1], &history_views[1]),
        ];

        Self {
            scene_view,
            history,
            composite_groups,
            present_groups,
            width,
            height,
        }
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}

fn create_particle_pipeline(device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::RenderPipeline) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Particle Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
    });

    let storage = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Particle Bind Group Layout"),
        entries: &[
            // Camera (Uniform) - Binding 0
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Positions, colors (Storage) - Bindings 1, 2
            storage(1),
            storage(2),
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Pipeline Layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Particle Render Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vertex"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fragment"),
            targets: &[Some(wgpu::ColorTargetState {
                format: OFFSCREEN_FORMAT,
                blend: Some(wgpu::BlendState {
                    color: ADDITIVE,
                    alpha: ADDITIVE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (layout, pipeline)
}

fn create_post_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Post Bind Group Layout"),
        entries: &[
            texture(0),
            texture(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

fn create_post_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Post Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<PostUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<crate::camera::CameraUniform>() % 16, 0);
    }

    #[test]
    fn test_instance_count_rejects_overflow() {
        assert_eq!(instance_count(3000), Some(3000));
        assert_eq!(instance_count(u32::MAX as usize), Some(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(instance_count(u32::MAX as usize + 1), None);
    }
}
