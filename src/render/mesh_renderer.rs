//! A mesh renderer for color-mapped 3D plots.
//!
//! This renderer draws a list of scene draw items (`scene::DrawItem3`) using
//! a per-vertex-color pipeline and a camera MVP.
//!
//! Design goals:
//! - Keep it minimal and easy to iterate on.
//! - Work in plot world coordinates (function units).
//! - Let the camera provide the world->clip transform.
//! - Allow per-item local transforms (world_from_local) and a per-item fill
//!   tint that multiplies the per-vertex colors.
//!
//! Batching model:
//! - All item geometry is concatenated into one vertex/index upload per
//!   pass, and per-item uniforms live at dynamic offsets in one uniform
//!   buffer. `Queue::write_buffer` stages writes that execute *before* the
//!   encoded pass runs, so per-item writes inside the draw loop would all
//!   collapse to the last item; uploading everything up front is required,
//!   not just faster.
//!
//! Debug mode:
//! - You can enable a "full-screen triangle" draw path to validate that the render pass,
//!   pipeline, and surface presentation are working, independent of camera math and scene data.
//!
//! Notes / current limitations:
//! - Uses u32 indices throughout (matches `scene::Mesh3`): a surface grid
//!   passes the u16 ceiling at ~256 subdivisions, well inside the supported
//!   resolution range.
//! - Depth testing is always on; culling is off so thin line quads and the
//!   underside of a surface stay visible.

use std::{borrow::Cow, mem};

use crate::render::gpu::Gpu;
use crate::scene::{Camera3D, DrawItem3, Rgba};

fn round_up_to(v: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (v + (align - 1)) & !(align - 1)
}

/// GPU vertex format for plot meshes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3 {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex3 {
    pub const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    #[inline]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Uniform layout for the vertex-color pipeline:
/// - `mvp`: clip_from_world * world_from_local
/// - `tint`: RGBA multiplied onto the interpolated vertex color
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct PlotUniforms {
    mvp: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl PlotUniforms {
    #[inline]
    fn new(mvp: glam::Mat4, tint: Rgba) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            tint: [tint.r, tint.g, tint.b, tint.a],
        }
    }
}

/// One recorded draw range within the batched buffers.
struct ItemDraw {
    index_range: std::ops::Range<u32>,
    base_vertex: i32,
    uniform_offset: u32,
}

/// A minimal mesh renderer that draws color-mapped meshes with depth.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,

    uniform_bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity_bytes: u64,
    /// Per-item slot stride, respecting the device's dynamic-offset alignment.
    uniform_stride: u64,

    // Reusable GPU buffers; resized on demand.
    vertex_buffer: wgpu::Buffer,
    vertex_capacity_bytes: u64,

    index_buffer: wgpu::Buffer,
    index_capacity_bytes: u64,

    /// If enabled, ignore scene items and draw a single full-screen triangle in clip-space.
    ///
    /// This is a debugging aid to validate that the render pipeline outputs pixels.
    debug_fullscreen_triangle: bool,
}

impl MeshRenderer {
    /// Enable or disable the full-screen triangle debug mode.
    ///
    /// When enabled, `draw_items()` will ignore the provided scene and render a single
    /// magenta quad directly in clip space.
    pub fn set_debug_fullscreen_triangle(&mut self, enabled: bool) {
        self.debug_fullscreen_triangle = enabled;
    }

    /// Create a new renderer with a vertex-color pipeline.
    ///
    /// This expects the surface format to be SRGB-view compatible; we target
    /// `gpu.surface_format.add_srgb_suffix()` for rendering and
    /// `gpu.depth_format` for the depth attachment.
    pub fn new(gpu: &Gpu) -> anyhow::Result<Self> {
        // Shader: keep it in a file so it can be iterated independently.
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("MeshRenderer Plot Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/vertex_color.wgsl"
                ))),
            });

        let uniform_bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("MeshRenderer Uniform BGL"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(
                                wgpu::BufferSize::new(mem::size_of::<PlotUniforms>() as u64)
                                    .unwrap(),
                            ),
                        },
                        count: None,
                    }],
                });

        let uniform_stride = round_up_to(
            mem::size_of::<PlotUniforms>() as u64,
            gpu.device
                .limits()
                .min_uniform_buffer_offset_alignment
                .max(1) as u64,
        );

        let uniform_capacity_bytes = uniform_stride * 16;
        let (uniform_buffer, uniform_bind_group) = Self::make_uniform_binding(
            gpu,
            &uniform_bind_group_layout,
            uniform_capacity_bytes,
        );

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("MeshRenderer Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("MeshRenderer Plot Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.surface_format.add_srgb_suffix(),
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    // Both sides stay visible: the underside of a surface and
                    // edge-on line quads would vanish under culling.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: gpu.depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        // Create small initial buffers; they'll grow as needed.
        let initial_vb = 1024u64;
        let initial_ib = 1024u64;

        let vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Vertex Buffer"),
            size: initial_vb,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Index Buffer"),
            size: initial_ib,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            uniform_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity_bytes,
            uniform_stride,
            vertex_buffer,
            vertex_capacity_bytes: initial_vb,
            index_buffer,
            index_capacity_bytes: initial_ib,
            debug_fullscreen_triangle: false,
        })
    }

    fn make_uniform_binding(
        gpu: &Gpu,
        layout: &wgpu::BindGroupLayout,
        size: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("MeshRenderer Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MeshRenderer Uniform BG"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(mem::size_of::<PlotUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Ensure the internal buffers can hold the staged upload sizes.
    fn ensure_capacity(&mut self, gpu: &Gpu, vb_bytes: u64, ib_bytes: u64, ub_bytes: u64) {
        if vb_bytes > self.vertex_capacity_bytes {
            // Grow to next power-ish to reduce realloc frequency.
            let new_size = vb_bytes.next_power_of_two().max(1024);
            self.vertex_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("MeshRenderer Vertex Buffer (resized)"),
                size: new_size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_capacity_bytes = new_size;
        }

        if ib_bytes > self.index_capacity_bytes {
            let new_size = ib_bytes.next_power_of_two().max(1024);
            self.index_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("MeshRenderer Index Buffer (resized)"),
                size: new_size,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.index_capacity_bytes = new_size;
        }

        if ub_bytes > self.uniform_capacity_bytes {
            let new_size = ub_bytes.next_power_of_two().max(self.uniform_stride);
            let (buffer, bind_group) =
                Self::make_uniform_binding(gpu, &self.uniform_bind_group_layout, new_size);
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
            self.uniform_capacity_bytes = new_size;
        }
    }

    /// Write `data` into `buffer`, padding to `COPY_BUFFER_ALIGNMENT`.
    ///
    /// wgpu requires `Queue::write_buffer` writes to respect the 4-byte copy
    /// alignment; our data lengths can be arbitrary, so we pad uploads and
    /// slice only the real ranges when drawing.
    fn write_padded(gpu: &Gpu, buffer: &wgpu::Buffer, data: &[u8]) {
        let len = data.len() as u64;
        let upload = round_up_to(len, wgpu::COPY_BUFFER_ALIGNMENT);
        if upload == len {
            gpu.queue.write_buffer(buffer, 0, data);
        } else {
            let mut padded = Vec::<u8>::with_capacity(upload as usize);
            padded.extend_from_slice(data);
            padded.resize(upload as usize, 0);
            gpu.queue.write_buffer(buffer, 0, &padded);
        }
    }

    /// Stage all item geometry and uniforms, then draw each recorded range.
    ///
    /// The caller is responsible for:
    /// - creating the render pass (with the depth attachment bound)
    /// - clearing background and depth
    /// - sorting items by z if desired
    ///
    /// Coordinate mapping:
    /// - Item vertices are in *local plot* coordinates.
    /// - Each item has a `world_from_local` matrix.
    /// - Camera provides `clip_from_world`.
    ///
    /// Final transform: `clip_from_local = clip_from_world * world_from_local`.
    pub fn draw_items<'pass>(
        &'pass mut self,
        gpu: &Gpu,
        pass: &mut wgpu::RenderPass<'pass>,
        camera: &Camera3D,
        items: &[DrawItem3],
    ) -> anyhow::Result<()> {
        pass.set_pipeline(&self.pipeline);

        // Debug: render a full-screen quad in clip space (no camera dependency).
        //
        // Keeping vertices well within clip space avoids any surprises from precision
        // or coordinate convention issues.
        if self.debug_fullscreen_triangle {
            let magenta = [1.0, 0.0, 1.0];
            let vertices = [
                Vertex3 {
                    position: [-1.0, -1.0, 0.5],
                    color: magenta,
                },
                Vertex3 {
                    position: [1.0, -1.0, 0.5],
                    color: magenta,
                },
                Vertex3 {
                    position: [-1.0, 1.0, 0.5],
                    color: magenta,
                },
                Vertex3 {
                    position: [1.0, 1.0, 0.5],
                    color: magenta,
                },
            ];
            let indices: [u32; 6] = [0, 1, 2, 2, 1, 3];

            let vb_bytes = mem::size_of_val(&vertices) as u64;
            let ib_bytes = mem::size_of_val(&indices) as u64;
            self.ensure_capacity(gpu, vb_bytes, ib_bytes, self.uniform_stride);

            Self::write_padded(gpu, &self.vertex_buffer, bytemuck::cast_slice(&vertices));
            Self::write_padded(gpu, &self.index_buffer, bytemuck::cast_slice(&indices));

            // Identity MVP: positions are already in clip space.
            let uniforms = PlotUniforms::new(glam::Mat4::IDENTITY, Rgba::WHITE);
            gpu.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

            pass.set_bind_group(0, &self.uniform_bind_group, &[0]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vb_bytes));
            pass.set_index_buffer(
                self.index_buffer.slice(..ib_bytes),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..(indices.len() as u32), 0, 0..1);

            return Ok(());
        }

        // Precompute the camera matrix once per pass.
        let clip_from_world = camera.clip_from_world();

        // Stage: concatenate geometry, lay uniforms out at aligned offsets.
        let mut vertices: Vec<Vertex3> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut uniform_bytes: Vec<u8> = Vec::new();
        let mut draws: Vec<ItemDraw> = Vec::new();

        for item in items {
            if item.mesh.positions.is_empty() || item.mesh.indices.is_empty() {
                continue;
            }

            let base_vertex = vertices.len() as i32;
            let index_start = indices.len() as u32;

            vertices.extend(
                item.mesh
                    .positions
                    .iter()
                    .zip(&item.mesh.colors)
                    .map(|(&position, &color)| Vertex3 { position, color }),
            );
            indices.extend_from_slice(&item.mesh.indices);

            let uniform_offset = uniform_bytes.len() as u32;
            let mvp = clip_from_world * item.world_from_local;
            uniform_bytes.extend_from_slice(bytemuck::bytes_of(&PlotUniforms::new(mvp, item.fill)));
            uniform_bytes.resize(uniform_offset as usize + self.uniform_stride as usize, 0);

            draws.push(ItemDraw {
                index_range: index_start..indices.len() as u32,
                base_vertex,
                uniform_offset,
            });
        }

        if draws.is_empty() {
            return Ok(());
        }

        let vb_bytes = (vertices.len() * mem::size_of::<Vertex3>()) as u64;
        let ib_bytes = (indices.len() * mem::size_of::<u32>()) as u64;
        self.ensure_capacity(gpu, vb_bytes, ib_bytes, uniform_bytes.len() as u64);

        Self::write_padded(gpu, &self.vertex_buffer, bytemuck::cast_slice(&vertices));
        Self::write_padded(gpu, &self.index_buffer, bytemuck::cast_slice(&indices));
        Self::write_padded(gpu, &self.uniform_buffer, &uniform_bytes);

        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vb_bytes));
        pass.set_index_buffer(
            self.index_buffer.slice(..ib_bytes),
            wgpu::IndexFormat::Uint32,
        );

        for draw in &draws {
            pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);
            pass.draw_indexed(draw.index_range.clone(), draw.base_vertex, 0..1);
        }

        Ok(())
    }
}
