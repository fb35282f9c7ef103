//! Math types for the fixelview renderer
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector, laid out for direct upload into vertex buffers
//! - [`Affine3`] - voxel index to scanner-space transform
//! - [`Mat4`] - column-major 4x4 matrix used for the model-view-projection

mod vec3;
pub mod affine;
pub mod mat4;

pub use vec3::Vec3;
pub use affine::Affine3;
pub use mat4::Mat4;
