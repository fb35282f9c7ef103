//! GPU resource lifetime for a fixel image
//!
//! The vertex buffer and its layout are acquired together once, when the field
//! is loaded, and released together exactly once when the owner is dropped.
//! A handle still `None` (never allocated) is skipped on release.

use std::rc::Rc;

use fixelview_math::Vec3;

use crate::gpu::{BufferId, GpuContext, VertexLayoutId};

/// Vertex buffer and vertex layout owned by one fixel image
pub struct GpuResources<G: GpuContext> {
    gpu: Rc<G>,
    vertex_buffer: Option<BufferId>,
    vertex_layout: Option<VertexLayoutId>,
}

impl<G: GpuContext> GpuResources<G> {
    /// Holder with nothing allocated
    pub fn empty(gpu: Rc<G>) -> Self {
        Self {
            gpu,
            vertex_buffer: None,
            vertex_layout: None,
        }
    }

    /// Upload `vertices` and create the layout reading them
    pub fn upload(gpu: Rc<G>, label: &str, vertices: &[Vec3]) -> Self {
        let vertex_buffer = gpu.create_vertex_buffer(label, vertices);
        let vertex_layout = gpu.create_vertex_layout(vertex_buffer);
        Self {
            gpu,
            vertex_buffer: Some(vertex_buffer),
            vertex_layout: Some(vertex_layout),
        }
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn vertex_buffer(&self) -> Option<BufferId> {
        self.vertex_buffer
    }

    pub fn vertex_layout(&self) -> Option<VertexLayoutId> {
        self.vertex_layout
    }

    /// Release whatever is still allocated
    pub fn release(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            self.gpu.delete_buffer(buffer);
        }
        if let Some(layout) = self.vertex_layout.take() {
            self.gpu.delete_vertex_layout(layout);
        }
    }
}

impl<G: GpuContext> Drop for GpuResources<G> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GpuCall, RecordingGpu};

    #[test]
    fn test_upload_then_drop_releases_once() {
        let gpu = Rc::new(RecordingGpu::new());
        let resources = GpuResources::upload(gpu.clone(), "test", &[Vec3::ZERO; 4]);
        let buffer = resources.vertex_buffer().unwrap();
        let layout = resources.vertex_layout().unwrap();
        drop(resources);

        assert_eq!(gpu.count(|c| *c == GpuCall::DeleteBuffer(buffer)), 1);
        assert_eq!(gpu.count(|c| *c == GpuCall::DeleteVertexLayout(layout)), 1);
    }

    #[test]
    fn test_explicit_release_is_idempotent() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut resources = GpuResources::upload(gpu.clone(), "test", &[Vec3::ZERO; 2]);
        resources.release();
        resources.release();
        drop(resources);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::DeleteBuffer(_))), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::DeleteVertexLayout(_))), 1);
    }

    #[test]
    fn test_unallocated_skips_release() {
        let gpu = Rc::new(RecordingGpu::new());
        drop(GpuResources::empty(gpu.clone()));
        assert!(gpu.calls().is_empty());
    }
}
