//! Headless [`GpuContext`] that records every call
//!
//! Lets the renderer run without a device: tests assert on the recorded call
//! sequence, and tools can inspect what a frame would draw.

use std::cell::{Cell, RefCell};

use fixelview_math::Vec3;

use crate::gpu::{BufferId, GpuContext, VertexLayoutId};
use crate::pipeline::{FixelUniforms, RenderState, ShaderProgram};

/// One recorded primitive call
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    CreateBuffer { id: BufferId, vertex_count: usize },
    CreateVertexLayout { id: VertexLayoutId, buffer: BufferId },
    DeleteBuffer(BufferId),
    DeleteVertexLayout(VertexLayoutId),
    UseProgram(u64),
    SetUniforms(FixelUniforms),
    SetRenderState(RenderState),
    BindVertexLayout(VertexLayoutId),
    MultiDrawLines { firsts: Vec<u32>, counts: Vec<u32> },
}

/// Recording implementation of [`GpuContext`]
#[derive(Debug, Default)]
pub struct RecordingGpu {
    calls: RefCell<Vec<GpuCall>>,
    next_id: Cell<u32>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record(&self, call: GpuCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Copy of every call so far
    pub fn calls(&self) -> Vec<GpuCall> {
        self.calls.borrow().clone()
    }

    /// Remove and return the recorded calls
    pub fn take_calls(&self) -> Vec<GpuCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Recorded multi-draws as (firsts, counts)
    pub fn draws(&self) -> Vec<(Vec<u32>, Vec<u32>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GpuCall::MultiDrawLines { firsts, counts } => Some((firsts.clone(), counts.clone())),
                _ => None,
            })
            .collect()
    }

    /// Recorded render states, in order
    pub fn render_states(&self) -> Vec<RenderState> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GpuCall::SetRenderState(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `pred`
    pub fn count(&self, pred: impl Fn(&GpuCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl GpuContext for RecordingGpu {
    fn create_vertex_buffer(&self, _label: &str, vertices: &[Vec3]) -> BufferId {
        let id = BufferId(self.allocate_id());
        self.record(GpuCall::CreateBuffer { id, vertex_count: vertices.len() });
        id
    }

    fn create_vertex_layout(&self, buffer: BufferId) -> VertexLayoutId {
        let id = VertexLayoutId(self.allocate_id());
        self.record(GpuCall::CreateVertexLayout { id, buffer });
        id
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.record(GpuCall::DeleteBuffer(buffer));
    }

    fn delete_vertex_layout(&self, layout: VertexLayoutId) {
        self.record(GpuCall::DeleteVertexLayout(layout));
    }

    fn use_program(&self, program: &ShaderProgram) {
        self.record(GpuCall::UseProgram(program.id()));
    }

    fn set_uniforms(&self, uniforms: &FixelUniforms) {
        self.record(GpuCall::SetUniforms(*uniforms));
    }

    fn set_render_state(&self, state: &RenderState) {
        self.record(GpuCall::SetRenderState(*state));
    }

    fn bind_vertex_layout(&self, layout: VertexLayoutId) {
        self.record(GpuCall::BindVertexLayout(layout));
    }

    fn multi_draw_lines(&self, firsts: &[u32], counts: &[u32]) {
        self.record(GpuCall::MultiDrawLines {
            firsts: firsts.to_vec(),
            counts: counts.to_vec(),
        });
    }
}
