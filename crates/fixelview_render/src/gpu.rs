//! Graphics primitives used by the fixel renderer
//!
//! The renderer only needs a handful of operations: upload a vertex buffer,
//! describe how it is read, pick a program and its uniforms, set blend/depth
//! state and issue a multi-draw. Implementations take `&self` and keep their
//! own interior state; everything runs on the render thread.

use fixelview_math::Vec3;

use crate::pipeline::{FixelUniforms, RenderState, ShaderProgram};

/// Handle to a vertex buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Handle to a vertex layout (the attribute bindings over one buffer)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexLayoutId(pub u32);

/// Line drawing primitives
pub trait GpuContext {
    /// Upload vertices into a new static buffer
    fn create_vertex_buffer(&self, label: &str, vertices: &[Vec3]) -> BufferId;

    /// Bind `buffer` as the pos/prev/next attribute triple
    fn create_vertex_layout(&self, buffer: BufferId) -> VertexLayoutId;

    fn delete_buffer(&self, buffer: BufferId);

    fn delete_vertex_layout(&self, layout: VertexLayoutId);

    /// Select the program for subsequent draws, compiling it on first use
    fn use_program(&self, program: &ShaderProgram);

    fn set_uniforms(&self, uniforms: &FixelUniforms);

    fn set_render_state(&self, state: &RenderState);

    fn bind_vertex_layout(&self, layout: VertexLayoutId);

    /// Draw `counts[i]` vertices from `firsts[i]` as a line list, for every i
    fn multi_draw_lines(&self, firsts: &[u32], counts: &[u32]);
}
