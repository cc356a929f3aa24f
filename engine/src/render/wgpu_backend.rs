use std::{collections::HashMap, fs};

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::{
    vertex_attr_array, AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource,
    BindingType, Buffer, BufferBindingType, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode, DeviceDescriptor, Extent3d,
    FilterMode, FragmentState, Instance, LoadOp, MultisampleState, Operations, Origin3d,
    PipelineLayoutDescriptor, PresentMode, PrimitiveState, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, Sampler,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderSource,
    SurfaceConfiguration, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureView, TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    collision::CollisionShape,
    math::{Camera2D, Transform2D, Vec2},
    render::sprite::{Sprite, TextureHandle},
};

/// Maximum number of quads (sprites plus debug shapes) drawn per frame.
pub const MAX_SPRITES_PER_FRAME: usize = 512;

/// Thickness of debug outlines, in world units.
const DEBUG_LINE_WIDTH: f32 = 1.5;

/// Queued sprite draw command, flushed in one pass by `end_frame`.
struct SpriteDrawCommand {
    uniform_offset: u64,
    texture_handle: TextureHandle,
}

/// Wrapper around wgpu surface/device setup and simple frame management.
pub struct Renderer<'window> {
    backend: WgpuBackend<'window>,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let backend = WgpuBackend::new(window, vsync)?;
        Ok(Self { backend })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.backend.resize(new_size);
    }

    pub fn begin_frame(&mut self) -> Result<Frame> {
        self.backend.begin_frame()
    }

    /// Set the colour the frame is cleared to before any quad is drawn.
    pub fn clear(&mut self, frame: &mut Frame, color: [f32; 4]) -> Result<()> {
        if frame.encoder.is_none() {
            return Err(anyhow!("Frame already ended"));
        }
        frame.clear_color = color;
        Ok(())
    }

    /// Queue `sprite` with its node origin at `origin` (world units).
    pub fn draw_sprite(
        &mut self,
        frame: &mut Frame,
        sprite: &Sprite,
        origin: Vec2,
        camera: &Camera2D,
    ) -> Result<()> {
        self.backend.draw_sprite(frame, sprite, origin, camera)
    }

    /// Queue an outline of a collision shape centred at `origin`.
    pub fn draw_debug_shape(
        &mut self,
        frame: &mut Frame,
        shape: CollisionShape,
        origin: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        self.backend
            .draw_debug_shape(frame, shape, origin, color, camera)
    }

    pub fn end_frame(&mut self, frame: Frame) -> Result<()> {
        self.backend.end_frame(frame)
    }

    pub fn load_texture_from_file(&mut self, path: &str) -> Result<TextureHandle> {
        self.backend.load_texture_from_file(path)
    }

    pub fn load_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle> {
        self.backend.load_texture_from_bytes(bytes)
    }

    /// Load a texture from raw RGBA8 data (no PNG decoding).
    ///
    /// `data` must be `width * height * 4` bytes in RGBA8 format.
    pub fn load_texture_from_rgba(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        self.backend.load_texture_from_rgba(data, width, height)
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.backend.texture_size(handle)
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.backend.surface_size()
    }
}

pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: TextureView,
    encoder: Option<CommandEncoder>,
    sprite_draws: Vec<SpriteDrawCommand>,
    clear_color: [f32; 4],
}

impl Drop for Frame {
    fn drop(&mut self) {
        // A frame dropped without end_frame still has to hand its texture back.
        if let Some(surface_texture) = self.surface_texture.take() {
            surface_texture.present();
        }
    }
}

struct TextureEntry {
    /// The underlying GPU texture. Must be kept alive for the view/sampler to be valid.
    #[allow(dead_code)]
    texture: Texture,
    view: TextureView,
    sampler: Sampler,
    size: (u32, u32),
}

struct SpritePipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group_layout: BindGroupLayout,
    uniform_buffer_size: u64,
    uniform_alignment: u64,
}

struct WgpuBackend<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    sprite_pipeline: SpritePipeline,
    textures: HashMap<TextureHandle, TextureEntry>,
    next_texture_id: u32,
    uniform_write_offset: u64,
    bind_groups: HashMap<TextureHandle, BindGroup>,
    white_texture: TextureHandle,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SpriteVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

/// Matches `SpriteUniforms` in sprite.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SpriteUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
    uv_offset: [f32; 2],
    uv_scale: [f32; 2],
    /// 0 = plain quad, 1 = ring, 2 = rectangle frame.
    mask: f32,
    _pad: f32,
    /// Outline thickness in quad-local units (0..0.5) per axis.
    edge: [f32; 2],
}

const MASK_NONE: f32 = 0.0;
const MASK_RING: f32 = 1.0;
const MASK_FRAME: f32 = 2.0;

// Unit quad, +Y up, UV origin at the top-left of the source rect.
const SPRITE_VERTICES: [SpriteVertex; 6] = [
    SpriteVertex {
        position: [-0.5, 0.5],
        uv: [0.0, 0.0],
    },
    SpriteVertex {
        position: [0.5, 0.5],
        uv: [1.0, 0.0],
    },
    SpriteVertex {
        position: [0.5, -0.5],
        uv: [1.0, 1.0],
    },
    SpriteVertex {
        position: [-0.5, 0.5],
        uv: [0.0, 0.0],
    },
    SpriteVertex {
        position: [0.5, -0.5],
        uv: [1.0, 1.0],
    },
    SpriteVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 1.0],
    },
];

impl<'window> WgpuBackend<'window> {
    fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        log::debug!("Creating wgpu renderer");
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        log::debug!("Chosen adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("flappy-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sprite_pipeline = create_sprite_pipeline(&device, format);

        let mut backend = Self {
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            sprite_pipeline,
            textures: HashMap::new(),
            next_texture_id: 1,
            uniform_write_offset: 0,
            bind_groups: HashMap::new(),
            white_texture: TextureHandle(0),
        };
        backend.white_texture = backend.load_texture_from_rgba(&[255, 255, 255, 255], 1, 1)?;
        log::debug!("Renderer ready ({format:?}, {present_mode:?})");
        Ok(backend)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn begin_frame(&mut self) -> Result<Frame> {
        self.uniform_write_offset = 0;

        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => {
                    let view = surface_texture
                        .texture
                        .create_view(&TextureViewDescriptor::default());
                    let encoder = self
                        .device
                        .create_command_encoder(&CommandEncoderDescriptor {
                            label: Some("frame-encoder"),
                        });

                    return Ok(Frame {
                        surface_texture: Some(surface_texture),
                        view,
                        encoder: Some(encoder),
                        sprite_draws: Vec::new(),
                        clear_color: [0.0, 0.0, 0.0, 1.0],
                    });
                }
                Err(e) => match e {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        log::warn!("Surface {e:?}; reconfiguring");
                        self.surface.configure(&self.device, &self.surface_config);
                        continue;
                    }
                    wgpu::SurfaceError::Timeout => {
                        continue;
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        return Err(anyhow!("Surface ran out of memory"));
                    }
                    wgpu::SurfaceError::Other => {
                        return Err(anyhow!("Surface error: Other"));
                    }
                },
            }
        }
    }

    fn draw_sprite(
        &mut self,
        frame: &mut Frame,
        sprite: &Sprite,
        origin: Vec2,
        camera: &Camera2D,
    ) -> Result<()> {
        let texture_size = self
            .textures
            .get(&sprite.texture)
            .map(|t| t.size)
            .ok_or_else(|| anyhow!("Unknown texture handle {:?}", sprite.texture))?;

        let transform = Transform2D::new(sprite.quad_center(origin), Vec2::ONE, 0.0);
        let uv = sprite.uv_rect(texture_size);
        let mvp = camera.view_projection() * transform.to_matrix(sprite.size());

        let uniforms = SpriteUniforms {
            mvp: mvp.to_cols_array_2d(),
            color: sprite.tint,
            uv_offset: [uv[0], uv[1]],
            uv_scale: [uv[2], uv[3]],
            mask: MASK_NONE,
            _pad: 0.0,
            edge: [0.0, 0.0],
        };
        self.queue_quad(frame, sprite.texture, &uniforms)
    }

    fn draw_debug_shape(
        &mut self,
        frame: &mut Frame,
        shape: CollisionShape,
        origin: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        let (size, mask) = match shape {
            CollisionShape::Sphere { radius } => (Vec2::new(radius * 2.0, radius * 2.0), MASK_RING),
            CollisionShape::Box { width, height } => (Vec2::new(width, height), MASK_FRAME),
        };
        let edge = [
            (DEBUG_LINE_WIDTH / size.x.max(f32::EPSILON)).min(0.5),
            (DEBUG_LINE_WIDTH / size.y.max(f32::EPSILON)).min(0.5),
        ];

        let transform = Transform2D::new(origin, Vec2::ONE, 0.0);
        let mvp = camera.view_projection() * transform.to_matrix(size);
        let uniforms = SpriteUniforms {
            mvp: mvp.to_cols_array_2d(),
            color,
            uv_offset: [0.0, 0.0],
            uv_scale: [1.0, 1.0],
            mask,
            _pad: 0.0,
            edge,
        };
        let white = self.white_texture;
        self.queue_quad(frame, white, &uniforms)
    }

    /// Write uniforms at the next aligned offset and queue a draw for `texture_handle`.
    fn queue_quad(
        &mut self,
        frame: &mut Frame,
        texture_handle: TextureHandle,
        uniforms: &SpriteUniforms,
    ) -> Result<()> {
        if frame.encoder.is_none() {
            return Err(anyhow!("Frame already ended"));
        }
        if self.uniform_write_offset >= self.sprite_pipeline.uniform_buffer_size {
            return Err(anyhow!(
                "Too many sprites drawn in one frame (max: {})",
                MAX_SPRITES_PER_FRAME
            ));
        }

        let aligned_offset = self.uniform_write_offset;
        self.queue.write_buffer(
            &self.sprite_pipeline.uniform_buffer,
            aligned_offset,
            bytemuck::bytes_of(uniforms),
        );

        if !self.bind_groups.contains_key(&texture_handle) {
            let texture = self
                .textures
                .get(&texture_handle)
                .ok_or_else(|| anyhow!("Unknown texture handle {texture_handle:?}"))?;
            let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
                label: Some("sprite-bind-group"),
                layout: &self.sprite_pipeline.bind_group_layout,
                entries: &[
                    BindGroupEntry {
                        binding: 0,
                        resource: BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &self.sprite_pipeline.uniform_buffer,
                            offset: 0,
                            size: std::num::NonZeroU64::new(
                                std::mem::size_of::<SpriteUniforms>() as u64,
                            ),
                        }),
                    },
                    BindGroupEntry {
                        binding: 1,
                        resource: BindingResource::TextureView(&texture.view),
                    },
                    BindGroupEntry {
                        binding: 2,
                        resource: BindingResource::Sampler(&texture.sampler),
                    },
                ],
            });
            self.bind_groups.insert(texture_handle, bind_group);
        }

        frame.sprite_draws.push(SpriteDrawCommand {
            uniform_offset: aligned_offset,
            texture_handle,
        });
        self.uniform_write_offset = aligned_offset + self.sprite_pipeline.uniform_alignment;
        Ok(())
    }

    fn end_frame(&mut self, mut frame: Frame) -> Result<()> {
        let mut encoder = frame
            .encoder
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;

        {
            let color = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("sprite-pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: color[0] as f64,
                            g: color[1] as f64,
                            b: color[2] as f64,
                            a: color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.sprite_pipeline.pipeline);
            pass.set_vertex_buffer(0, self.sprite_pipeline.vertex_buffer.slice(..));

            for draw_cmd in &frame.sprite_draws {
                let bind_group = self
                    .bind_groups
                    .get(&draw_cmd.texture_handle)
                    .ok_or_else(|| anyhow!("Bind group not found for texture handle"))?;
                pass.set_bind_group(0, bind_group, &[draw_cmd.uniform_offset as u32]);
                pass.draw(0..SPRITE_VERTICES.len() as u32, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));

        let surface_texture = frame
            .surface_texture
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;
        surface_texture.present();
        Ok(())
    }

    fn load_texture_from_file(&mut self, path: &str) -> Result<TextureHandle> {
        let data = fs::read(path)?;
        self.load_texture_from_bytes(&data)
    }

    fn load_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        self.load_texture_from_rgba(&image, width, height)
    }

    fn load_texture_from_rgba(&mut self, data: &[u8], width: u32, height: u32) -> Result<TextureHandle> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(anyhow!(
                "RGBA data is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            ));
        }

        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&TextureViewDescriptor::default());

        // Atlas regions sit edge to edge, so nearest sampling keeps neighbours from bleeding in.
        let sampler = self.device.create_sampler(&SamplerDescriptor {
            label: Some("atlas-sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let handle = TextureHandle(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                view,
                sampler,
                size: (width, height),
            },
        );

        Ok(handle)
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).map(|t| t.size)
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

fn create_sprite_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> SpritePipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("sprite-shader"),
        source: ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    });

    let uniform_size = std::mem::size_of::<SpriteUniforms>() as u64;

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("sprite-bind-group-layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: std::num::NonZeroU64::new(uniform_size),
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("sprite-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sprite-vertices"),
        contents: bytemuck::cast_slice(&SPRITE_VERTICES),
        usage: BufferUsages::VERTEX,
    });

    // Each quad gets its own slot, rounded up to the dynamic offset alignment.
    let min_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
    let uniform_alignment = (uniform_size + min_alignment - 1) & !(min_alignment - 1);
    let uniform_buffer_size = MAX_SPRITES_PER_FRAME as u64 * uniform_alignment;

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite-uniform-buffer"),
        size: uniform_buffer_size,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("sprite-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    SpritePipeline {
        pipeline,
        vertex_buffer,
        uniform_buffer,
        bind_group_layout,
        uniform_buffer_size,
        uniform_alignment,
    }
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Auto))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Opaque))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_match_shader_layout() {
        // mat4 + vec4 + 2 * vec2 + 2 * f32 + vec2
        assert_eq!(std::mem::size_of::<SpriteUniforms>(), 112);
        assert_eq!(std::mem::size_of::<SpriteUniforms>() % 16, 0);
    }

    #[test]
    fn vsync_prefers_fifo() {
        let modes = [PresentMode::Immediate, PresentMode::Fifo];
        assert_eq!(choose_present_mode(&modes, true), PresentMode::Fifo);
        assert_eq!(choose_present_mode(&modes, false), PresentMode::Immediate);
        assert_eq!(choose_present_mode(&[PresentMode::Fifo], false), PresentMode::Fifo);
    }

    #[test]
    fn alpha_mode_falls_back_to_first() {
        let modes = [CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque];
        assert_eq!(choose_alpha_mode(&modes), CompositeAlphaMode::PreMultiplied);
        assert_eq!(choose_alpha_mode(&[]), CompositeAlphaMode::Opaque);
    }
}
