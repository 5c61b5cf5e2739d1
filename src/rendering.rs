//! Rendering system with wgpu pipeline and shader management.
//!
//! All rings share one fan index buffer. Ring k's vertices live at
//! `k * VERTICES_PER_RING` in the vertex buffer and its color/opacity at
//! instance k, so each ring is one `draw_indexed` with a base vertex.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::params::RenderConfig;
use crate::rings::{
    fan_indices, perimeter_uvs, RenderSink, Rgb, RingVisual, Vertex, VERTICES_PER_RING,
};

/// Uniform buffer for the ring shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Per-ring instance data: linear rgb + opacity
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct RingInstance {
    pub color: [f32; 4],
}

impl RingInstance {
    pub fn from_ring(ring: &RingVisual) -> Self {
        let [r, g, b] = ring.color.to_linear();
        Self {
            color: [r, g, b, ring.opacity.clamp(0.0, 1.0)],
        }
    }
}

/// CPU-side copy of every ring's vertices and instance data.
///
/// Rings that are not submitted keep their last contents.
pub struct RingStaging {
    uvs: Vec<[f32; 2]>,
    pub vertices: Vec<Vertex>,
    pub instances: Vec<RingInstance>,
}

impl RingStaging {
    pub fn new(ring_count: usize) -> Self {
        let mut staging = Self {
            uvs: perimeter_uvs(),
            vertices: Vec::new(),
            instances: Vec::new(),
        };
        staging.resize(ring_count);
        staging
    }

    pub fn ring_count(&self) -> usize {
        self.instances.len()
    }

    /// New rings start collapsed and transparent
    pub fn resize(&mut self, ring_count: usize) {
        self.vertices
            .resize(ring_count * VERTICES_PER_RING, Vertex::zeroed());
        self.instances.resize(ring_count, RingInstance::default());
    }

    pub fn write(&mut self, ring_index: usize, ring: &RingVisual) {
        if ring_index >= self.ring_count() {
            return;
        }
        let start = ring_index * VERTICES_PER_RING;
        let slots = &mut self.vertices[start..start + VERTICES_PER_RING];
        for ((slot, position), uv) in slots.iter_mut().zip(&ring.vertices).zip(&self.uvs) {
            *slot = Vertex {
                position: *position,
                uv: *uv,
            };
        }
        self.instances[ring_index] = RingInstance::from_ring(ring);
    }
}

/// Rendering system managing wgpu device, pipeline, and ring buffers
pub struct RenderSystem {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    index_count: u32,
    /// Rings the GPU buffers can hold
    ring_capacity: usize,
    staging: RingStaging,
    clear_color: wgpu::Color,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        render_config: &RenderConfig,
        ring_count: usize,
    ) -> Result<Self, String> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| format!("Failed to create surface: {}", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("Failed to find suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| format!("Failed to request device: {}", e))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or("Surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface: {}x{} {:?} via {:?}",
            config.width,
            config.height,
            config.format,
            adapter.get_info().backend
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ring Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("ring.wgsl").into()),
        });

        let ring_capacity = ring_count.max(1);
        let staging = RingStaging::new(ring_count);
        let (vertex_buffer, instance_buffer) = create_ring_buffers(&device, ring_capacity);

        let indices = fan_indices();
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ring Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniforms = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ring Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            wgpu::VertexAttribute {
                                offset: 0,
                                shader_location: 0,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                            wgpu::VertexAttribute {
                                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                                shader_location: 1,
                                format: wgpu::VertexFormat::Float32x2,
                            },
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<RingInstance>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x4,
                        }],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Rings are visible from both sides
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Layering comes from draw order, not depth
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let clear_color = clear_color(render_config.background);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            instance_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            index_count: indices.len() as u32,
            ring_capacity,
            staging,
            clear_color,
        })
    }

    /// Reconfigure the surface after a window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return; // Minimized
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Change the clear color drawn behind the rings
    pub fn set_background(&mut self, background: Rgb) {
        self.clear_color = clear_color(background);
    }

    /// Match the drawn ring count, growing GPU buffers when needed
    pub fn set_ring_count(&mut self, ring_count: usize) {
        if ring_count > self.ring_capacity {
            let (vertex_buffer, instance_buffer) = create_ring_buffers(&self.device, ring_count);
            self.vertex_buffer = vertex_buffer;
            self.instance_buffer = instance_buffer;
            self.ring_capacity = ring_count;
        }
        self.staging.resize(ring_count);
    }

    pub fn update_uniforms(&self, uniforms: &Uniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Upload staged rings and draw them, outermost first
    pub fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let ring_count = self.staging.ring_count();
        if ring_count > 0 {
            self.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.staging.vertices),
            );
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.staging.instances),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for k in (0..ring_count).rev() {
                let base_vertex = (k * VERTICES_PER_RING) as i32;
                let instance = k as u32;
                render_pass.draw_indexed(0..self.index_count, base_vertex, instance..instance + 1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl RenderSink for RenderSystem {
    fn submit(&mut self, ring_index: usize, ring: &RingVisual) {
        self.staging.write(ring_index, ring);
    }
}

fn clear_color(background: Rgb) -> wgpu::Color {
    let [r, g, b] = background.to_linear();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

fn create_ring_buffers(device: &wgpu::Device, ring_capacity: usize) -> (wgpu::Buffer, wgpu::Buffer) {
    let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Ring Vertex Buffer"),
        size: (ring_capacity * VERTICES_PER_RING * std::mem::size_of::<Vertex>())
            as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Ring Instance Buffer"),
        size: (ring_capacity * std::mem::size_of::<RingInstance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    (vertex_buffer, instance_buffer)
}
