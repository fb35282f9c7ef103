//! Rendering pipeline components
//!
//! GPU data layouts, WGSL program synthesis, blend/depth state handling and
//! the wgpu line pipeline.

pub mod types;
pub mod shader;
pub mod render_state;
pub mod line_pipeline;

pub use types::{FixelUniforms, DrawIndirectArgs};
pub use shader::{FixelShader, ShaderKey, ShaderProgram};
pub use render_state::{RenderState, RenderStateGuard};
pub use line_pipeline::LinePipeline;
