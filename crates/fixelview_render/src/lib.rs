//! Fixel Rendering Library
//!
//! This crate draws a tessellated fixel field as oriented line segments, either
//! the whole volume or a single slice, through a small graphics-primitive
//! trait so the same code drives wgpu and headless recording.
//!
//! ## Key Components
//!
//! - [`gpu::GpuContext`] - buffer, vertex layout, state and multi-draw primitives
//! - [`pipeline::LinePipeline`] - wgpu implementation of [`gpu::GpuContext`]
//! - [`recording::RecordingGpu`] - headless implementation that records calls
//! - [`pipeline::shader`] - WGSL program synthesis per colouring configuration
//! - [`pipeline::RenderStateGuard`] - scoped blend/depth state
//! - [`resources::GpuResources`] - vertex buffer and layout lifetime
//! - [`fixel_image::FixelImage`] - the renderable fixel field
//! - [`context::RenderContext`] - wgpu device, queue and surface management

pub mod context;
pub mod camera;
pub mod gpu;
pub mod recording;
pub mod resources;
pub mod pipeline;
pub mod fixel_image;

pub use camera::{OrbitCamera, Projection};
pub use fixel_image::{FixelImage, FixelToolSettings};
pub use gpu::{BufferId, GpuContext, VertexLayoutId};
pub use recording::{GpuCall, RecordingGpu};
pub use resources::GpuResources;

// Re-export core types for convenience
pub use fixelview_core::{ColourType, Displayable, DisplayFlags, FixelGeometry, FixelSource, FixelVolume};
