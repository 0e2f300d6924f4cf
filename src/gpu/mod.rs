//! Window rendering with wgpu.
//!
//! [`GpuContext`] implements [`DrawContext`] by batching: lines become
//! pixel-space quads in a vertex buffer, circles become instances of a
//! signed-distance quad. [`present`](GpuContext::present) uploads both
//! batches and draws lines first, then circles, over the background colour.
//! That matches the field's frame order (connections under particles); a
//! caller interleaving the two kinds would see them regrouped.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::surface::{DrawContext, SurfaceHandle};

/// WGSL for both pipelines.
pub const FIELD_SHADER: &str = include_str!("field.wgsl");

/// Lines thinner than this are drawn this wide with proportionally less alpha.
const MIN_LINE_WIDTH: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Viewport {
    size: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    position: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct CircleInstance {
    center: [f32; 2],
    radius: f32,
    _pad: f32,
    color: [f32; 4],
}

const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: 8,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x4,
    },
];

const CIRCLE_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: 8,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32,
    },
    wgpu::VertexAttribute {
        offset: 16,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x4,
    },
];

/// CPU-side draw batches for one frame.
///
/// Kept separate from the GPU resources so the batching rules can be
/// exercised without a device.
#[derive(Debug, Default)]
pub(crate) struct Batch {
    pub lines: Vec<LineVertex>,
    pub circles: Vec<CircleInstance>,
}

impl Batch {
    fn clear(&mut self) {
        self.lines.clear();
        self.circles.clear();
    }

    /// Expand a segment into two triangles `width` pixels across.
    fn push_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4) {
        let direction = (to - from).normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }

        let drawn = width.max(MIN_LINE_WIDTH);
        let color = Vec4::new(color.x, color.y, color.z, color.w * (width / drawn).min(1.0));
        let normal = direction.perp() * (drawn * 0.5);

        let corners = [from - normal, from + normal, to - normal, to + normal];
        for i in [0, 1, 2, 2, 1, 3] {
            self.lines.push(LineVertex {
                position: corners[i].to_array(),
                color: color.to_array(),
            });
        }
    }

    fn push_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.circles.push(CircleInstance {
            center: center.to_array(),
            radius,
            _pad: 0.0,
            color: color.to_array(),
        });
    }
}

/// A growable GPU buffer.
struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl DynamicBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            label,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            *self = Self::new(device, self.label, needed.next_power_of_two());
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

/// Window-backed drawing context.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    line_pipeline: wgpu::RenderPipeline,
    circle_pipeline: wgpu::RenderPipeline,
    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    line_buffer: DynamicBuffer,
    circle_buffer: DynamicBuffer,
    batch: Batch,
    size: Vec2,
    background: Vec3,
    fill: Vec3,
    stroke: Vec3,
    alpha: f32,
    line_width: f32,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>, background: Vec3) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using GPU: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Field Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Palette values are sRGB-encoded already, so render to a linear
        // format to keep them exact.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let viewport = Viewport {
            size: [config.width as f32, config.height as f32],
            _pad: [0.0; 2],
        };
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Buffer"),
            contents: bytemuck::bytes_of(&viewport),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let viewport_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Viewport Bind Group Layout"),
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

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewport Bind Group"),
            layout: &viewport_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Field Shader"),
            source: wgpu::ShaderSource::Wgsl(FIELD_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&viewport_bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "Line Pipeline",
            ("vs_line", "fs_line"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRIBUTES,
            },
        );

        let circle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "Circle Pipeline",
            ("vs_circle", "fs_circle"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<CircleInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &CIRCLE_ATTRIBUTES,
            },
        );

        let line_buffer = DynamicBuffer::new(&device, "Line Vertex Buffer", 64 * 1024);
        let circle_buffer = DynamicBuffer::new(&device, "Circle Instance Buffer", 16 * 1024);

        Ok(Self {
            surface,
            device,
            queue,
            size: Vec2::new(config.width as f32, config.height as f32),
            config,
            line_pipeline,
            circle_pipeline,
            viewport_buffer,
            viewport_bind_group,
            line_buffer,
            circle_buffer,
            batch: Batch::default(),
            background,
            fill: Vec3::ZERO,
            stroke: Vec3::ZERO,
            alpha: 1.0,
            line_width: 1.0,
        })
    }

    /// Colour the frame is cleared to before drawing.
    pub fn set_background(&mut self, color: Vec3) {
        self.background = color;
    }

    /// Reconfigure the swapchain at the current size.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload this frame's batches and present them.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.line_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(&self.batch.lines));
        self.circle_buffer
            .write(&self.device, &self.queue, bytemuck::cast_slice(&self.batch.circles));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Field Encoder"),
            });

        {
            let bg = self.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.viewport_bind_group, &[]);

            let line_count = self.batch.lines.len() as u32;
            if line_count > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.buffer.slice(..));
                render_pass.draw(0..line_count, 0..1);
            }

            let circle_count = self.batch.circles.len() as u32;
            if circle_count > 0 {
                render_pass.set_pipeline(&self.circle_pipeline);
                render_pass.set_vertex_buffer(0, self.circle_buffer.buffer.slice(..));
                render_pass.draw(0..6, 0..circle_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl DrawContext for GpuContext {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_size(&mut self, size: Vec2) {
        self.size = size;
        let (width, height) = (size.x as u32, size.y as u32);
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);

            let viewport = Viewport {
                size: [width as f32, height as f32],
                _pad: [0.0; 2],
            };
            self.queue
                .write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&viewport));
        }
    }

    /// Any clear starts a new frame; partial clears are not tracked.
    fn clear_rect(&mut self, _origin: Vec2, _size: Vec2) {
        self.batch.clear();
    }

    fn set_fill_color(&mut self, color: Vec3) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Vec3) {
        self.stroke = color;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.batch
            .push_circle(center, radius, self.fill.extend(self.alpha));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.batch
            .push_line(from, to, self.line_width, self.stroke.extend(self.alpha));
    }
}

impl SurfaceHandle for GpuContext {
    type Context = GpuContext;

    fn context_2d(self) -> Option<GpuContext> {
        Some(self)
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    (vs_entry, fs_entry): (&str, &str),
    buffer: wgpu::VertexBufferLayout<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
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
    fn test_line_becomes_two_triangles() {
        let mut batch = Batch::default();
        batch.push_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0, Vec4::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(batch.lines.len(), 6);

        let ys: Vec<f32> = batch.lines.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 1.0).abs() < 1e-6));
        assert!(batch.lines.iter().all(|v| v.color == [1.0, 0.0, 0.0, 0.5]));
    }

    #[test]
    fn test_thin_line_trades_width_for_alpha() {
        let mut batch = Batch::default();
        batch.push_line(Vec2::ZERO, Vec2::new(0.0, 10.0), 0.5, Vec4::new(0.0, 0.0, 1.0, 0.4));
        let v = batch.lines[0];
        assert!((v.position[0].abs() - 0.5).abs() < 1e-6);
        assert!((v.color[3] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_line_skipped() {
        let mut batch = Batch::default();
        batch.push_line(Vec2::ONE, Vec2::ONE, 1.0, Vec4::ONE);
        assert!(batch.lines.is_empty());
    }

    #[test]
    fn test_circle_instance_layout() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 32);
        assert_eq!(std::mem::size_of::<LineVertex>(), 24);

        let mut batch = Batch::default();
        batch.push_circle(Vec2::new(3.0, 4.0), 2.5, Vec4::new(0.1, 0.2, 0.3, 0.9));
        assert_eq!(batch.circles[0].center, [3.0, 4.0]);
        assert_eq!(batch.circles[0].radius, 2.5);
        batch.clear();
        assert!(batch.circles.is_empty());
    }
}
