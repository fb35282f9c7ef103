//! wgpu line pipeline
//!
//! Implements [`GpuContext`] on a wgpu device. Draw calls made while a frame
//! is being rendered are recorded as batches (program, state, uniforms and
//! draw ranges); [`LinePipeline::encode`] replays them into a single render
//! pass. Render pipelines are created lazily and cached per program and
//! blend/depth configuration.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use fixelview_math::Vec3;

use super::render_state::RenderState;
use super::shader::ShaderProgram;
use super::types::{DrawIndirectArgs, FixelUniforms};
use crate::gpu::{BufferId, GpuContext, VertexLayoutId};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Stride of one vertex in the fixel buffer
const VERTEX_STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vec3>() as wgpu::BufferAddress;

static POS_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
static PREV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
static NEXT_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// Byte offsets at which the vertex buffer is bound for pos, prev and next
const SLOT_OFFSETS: [wgpu::BufferAddress; 3] = [VERTEX_STRIDE, 0, 2 * VERTEX_STRIDE];

/// The one vertex buffer is read through three slots
fn vertex_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [&POS_ATTRIBUTES, &PREV_ATTRIBUTES, &NEXT_ATTRIBUTES].map(|attributes| wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    })
}

/// Blend/depth configuration baked into a render pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: u64,
    additive: bool,
    depth_test: bool,
    depth_write: bool,
}

impl PipelineKey {
    fn new(program: u64, state: &RenderState) -> Self {
        Self {
            program,
            additive: state.is_translucent(),
            depth_test: state.depth_test,
            depth_write: state.depth_write,
        }
    }

    fn blend(&self) -> Option<wgpu::BlendState> {
        self.additive.then_some(ADDITIVE_CONSTANT_BLEND)
    }

    fn depth_compare(&self) -> wgpu::CompareFunction {
        if self.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        }
    }
}

/// `src * constant + dst`; the constant carries the line opacity
const ADDITIVE_CONSTANT_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Round `size` up to a multiple of `alignment`
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// One recorded multi-draw
#[derive(Clone, Debug)]
struct DrawBatch {
    pipeline: PipelineKey,
    blend_constant: Option<f32>,
    uniforms: FixelUniforms,
    buffer: BufferId,
    ranges: Vec<DrawIndirectArgs>,
}

struct ProgramModules {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

struct PipelineState {
    next_id: u32,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    layouts: HashMap<VertexLayoutId, BufferId>,
    programs: HashMap<u64, ProgramModules>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    program: Option<u64>,
    uniforms: FixelUniforms,
    render_state: RenderState,
    layout: Option<VertexLayoutId>,
    batches: Vec<DrawBatch>,
    /// Uniform buffer, its capacity in bytes and the bind group over it
    uniforms_binding: Option<(wgpu::Buffer, u64, wgpu::BindGroup)>,
    depth_texture: Option<wgpu::TextureView>,
    depth_size: (u32, u32),
    warned_line_width: bool,
}

/// wgpu implementation of [`GpuContext`]
pub struct LinePipeline {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface_format: wgpu::TextureFormat,
    multi_draw: bool,
    uniform_stride: u64,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    state: RefCell<PipelineState>,
}

impl LinePipeline {
    /// Create a pipeline drawing into targets of `surface_format`
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fixel Bind Group Layout"),
            entries: &[
                // Uniforms, one block per recorded batch
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FixelUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fixel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let multi_draw = device.features().contains(wgpu::Features::MULTI_DRAW_INDIRECT);
        if !multi_draw {
            log::info!("MULTI_DRAW_INDIRECT unavailable, issuing one draw per segment range");
        }

        let uniform_stride = aligned_stride(
            std::mem::size_of::<FixelUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        Self {
            device,
            queue,
            surface_format,
            multi_draw,
            uniform_stride,
            bind_group_layout,
            pipeline_layout,
            state: RefCell::new(PipelineState {
                next_id: 0,
                buffers: HashMap::new(),
                layouts: HashMap::new(),
                programs: HashMap::new(),
                pipelines: HashMap::new(),
                program: None,
                uniforms: FixelUniforms::default(),
                render_state: RenderState::OPAQUE,
                layout: None,
                batches: Vec::new(),
                uniforms_binding: None,
                depth_texture: None,
                depth_size: (0, 0),
                warned_line_width: false,
            }),
        }
    }

    /// Whether draws go through `multi_draw_indirect`
    pub fn supports_multi_draw(&self) -> bool {
        self.multi_draw
    }

    /// Number of draw batches waiting for [`Self::encode`]
    pub fn pending_batches(&self) -> usize {
        self.state.borrow().batches.len()
    }

    /// Ensure depth texture exists and is the right size
    pub fn ensure_depth_texture(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        if state.depth_texture.is_none() || state.depth_size != (width, height) {
            let depth_texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Fixel Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            state.depth_texture = Some(depth_texture.create_view(&wgpu::TextureViewDescriptor::default()));
            state.depth_size = (width, height);
        }
    }

    /// Replay the recorded batches into one render pass on `view`
    ///
    /// The pass clears to `clear_color`; the batch list is emptied.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let batches = std::mem::take(&mut state.batches);

        if state.depth_texture.is_none() {
            log::warn!("No depth texture; call ensure_depth_texture before encoding");
            return;
        }

        // Uniform blocks and indirect args for every batch, uploaded once
        let mut uniform_bytes = vec![0u8; (self.uniform_stride as usize) * batches.len().max(1)];
        let mut indirect = Vec::new();
        let mut indirect_offsets = Vec::with_capacity(batches.len());
        for (i, batch) in batches.iter().enumerate() {
            let start = i * self.uniform_stride as usize;
            let block = bytemuck::bytes_of(&batch.uniforms);
            uniform_bytes[start..start + block.len()].copy_from_slice(block);
            indirect_offsets.push(indirect.len());
            indirect.extend_from_slice(&batch.ranges);
        }

        let needed = uniform_bytes.len() as u64;
        if state.uniforms_binding.as_ref().map_or(true, |(_, capacity, _)| *capacity < needed) {
            state.uniforms_binding = Some(self.create_uniforms_binding(needed));
        }
        let (Some((uniform_buffer, _, bind_group)), Some(depth_view)) =
            (state.uniforms_binding.as_ref(), state.depth_texture.as_ref())
        else {
            return;
        };
        self.queue.write_buffer(uniform_buffer, 0, &uniform_bytes);

        let indirect_buffer = (self.multi_draw && !indirect.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Fixel Indirect Buffer"),
                contents: bytemuck::cast_slice(&indirect),
                usage: wgpu::BufferUsages::INDIRECT,
            })
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Fixel Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for (i, batch) in batches.iter().enumerate() {
            if batch.ranges.is_empty() {
                continue;
            }
            let (Some(pipeline), Some(buffer)) = (
                state.pipelines.get(&batch.pipeline),
                state.buffers.get(&batch.buffer),
            ) else {
                continue;
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, bind_group, &[(i as u64 * self.uniform_stride) as u32]);
            for (slot, offset) in SLOT_OFFSETS.iter().enumerate() {
                render_pass.set_vertex_buffer(slot as u32, buffer.slice(*offset..));
            }
            if let Some(alpha) = batch.blend_constant {
                let a = alpha as f64;
                render_pass.set_blend_constant(wgpu::Color { r: a, g: a, b: a, a });
            }

            match &indirect_buffer {
                Some(indirect_buffer) => {
                    let offset = (indirect_offsets[i] * std::mem::size_of::<DrawIndirectArgs>()) as u64;
                    render_pass.multi_draw_indirect(indirect_buffer, offset, batch.ranges.len() as u32);
                }
                None => {
                    for range in &batch.ranges {
                        render_pass.draw(
                            range.first_vertex..range.first_vertex + range.vertex_count,
                            0..1,
                        );
                    }
                }
            }
        }
    }

    fn create_uniforms_binding(&self, size: u64) -> (wgpu::Buffer, u64, wgpu::BindGroup) {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fixel Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fixel Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<FixelUniforms>() as u64),
                    }),
                },
            ],
        });
        (buffer, size, bind_group)
    }

    fn create_pipeline(&self, key: PipelineKey, modules: &ProgramModules) -> wgpu::RenderPipeline {
        log::debug!("Creating fixel line pipeline {:?}", key);
        let buffers = vertex_buffer_layouts();
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fixel Line Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &modules.vertex,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &modules.fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: key.blend(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth_write,
                depth_compare: key.depth_compare(),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn allocate_id(state: &mut PipelineState) -> u32 {
        state.next_id += 1;
        state.next_id
    }
}

impl GpuContext for LinePipeline {
    fn create_vertex_buffer(&self, label: &str, vertices: &[Vec3]) -> BufferId {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let mut state = self.state.borrow_mut();
        let id = BufferId(Self::allocate_id(&mut state));
        state.buffers.insert(id, buffer);
        id
    }

    fn create_vertex_layout(&self, buffer: BufferId) -> VertexLayoutId {
        let mut state = self.state.borrow_mut();
        let id = VertexLayoutId(Self::allocate_id(&mut state));
        state.layouts.insert(id, buffer);
        id
    }

    fn delete_buffer(&self, buffer: BufferId) {
        if let Some(buffer) = self.state.borrow_mut().buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn delete_vertex_layout(&self, layout: VertexLayoutId) {
        let mut state = self.state.borrow_mut();
        state.layouts.remove(&layout);
        if state.layout == Some(layout) {
            state.layout = None;
        }
    }

    fn use_program(&self, program: &ShaderProgram) {
        let mut state = self.state.borrow_mut();
        if !state.programs.contains_key(&program.id()) {
            let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Fixel Vertex Shader"),
                source: wgpu::ShaderSource::Wgsl(program.vertex.as_str().into()),
            });
            let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Fixel Fragment Shader"),
                source: wgpu::ShaderSource::Wgsl(program.fragment.as_str().into()),
            });
            state.programs.insert(program.id(), ProgramModules { vertex, fragment });
        }
        state.program = Some(program.id());
    }

    fn set_uniforms(&self, uniforms: &FixelUniforms) {
        self.state.borrow_mut().uniforms = *uniforms;
    }

    fn set_render_state(&self, render_state: &RenderState) {
        let mut state = self.state.borrow_mut();
        if render_state.line_width != 1.0 && !state.warned_line_width {
            log::warn!(
                "Line width {} requested; wgpu rasterizes lines one pixel wide",
                render_state.line_width
            );
            state.warned_line_width = true;
        }
        state.render_state = *render_state;
    }

    fn bind_vertex_layout(&self, layout: VertexLayoutId) {
        self.state.borrow_mut().layout = Some(layout);
    }

    fn multi_draw_lines(&self, firsts: &[u32], counts: &[u32]) {
        let mut state = self.state.borrow_mut();
        let (Some(program), Some(layout)) = (state.program, state.layout) else {
            log::warn!("Draw without a program or vertex layout ignored");
            return;
        };
        let Some(&buffer) = state.layouts.get(&layout) else {
            log::warn!("Draw with deleted vertex layout {:?} ignored", layout);
            return;
        };

        let key = PipelineKey::new(program, &state.render_state);
        if !state.pipelines.contains_key(&key) {
            let Some(modules) = state.programs.get(&program) else {
                return;
            };
            let pipeline = self.create_pipeline(key, modules);
            state.pipelines.insert(key, pipeline);
        }

        let ranges = firsts
            .iter()
            .zip(counts)
            .map(|(&first, &count)| DrawIndirectArgs::lines(first, count))
            .collect();
        let batch = DrawBatch {
            pipeline: key,
            blend_constant: state.render_state.blend_alpha,
            uniforms: state.uniforms,
            buffer,
            ranges,
        };
        state.batches.push(batch);
    }
}

impl Drop for LinePipeline {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if !state.buffers.is_empty() {
            log::debug!("Releasing {} fixel vertex buffers", state.buffers.len());
        }
    }
}
