//! GPU-compatible data types for the fixel line pipeline
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};

use fixelview_math::mat4::{self, Mat4};

/// Uniform block shared by the vertex and fragment programs
/// Layout: 112 bytes total (must match `FixelUniforms` in the generated WGSL)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FixelUniforms {
    /// Model-view-projection (64 bytes)
    pub mvp: Mat4,
    /// Constant colour for `ColourType::Colour` (12 bytes)
    pub const_colour: [f32; 3],
    /// Half-length of a segment in scanner units
    pub line_length: f32,
    /// Largest observed value
    pub max_value: f32,
    /// Window minimum
    pub offset: f32,
    /// Inverse window width
    pub scale: f32,
    /// Lower clip threshold
    pub lower: f32,
    /// Upper clip threshold
    pub upper: f32,
    /// Non-zero to scale segments by their value
    pub scale_line_length_by_value: u32,
    /// Pads the block to a 16-byte multiple
    pub _padding: [u32; 2],
}

impl Default for FixelUniforms {
    fn default() -> Self {
        Self {
            mvp: mat4::IDENTITY,
            const_colour: [1.0, 1.0, 1.0],
            line_length: 1.0,
            max_value: 1.0,
            offset: 0.0,
            scale: 1.0,
            lower: f32::NEG_INFINITY,
            upper: f32::INFINITY,
            scale_line_length_by_value: 0,
            _padding: [0; 2],
        }
    }
}

/// Indirect draw arguments structure (matches wgpu's DrawIndirect)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndirectArgs {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl DrawIndirectArgs {
    /// Single-instance draw of `vertex_count` vertices from `first_vertex`
    pub fn lines(first_vertex: u32, vertex_count: u32) -> Self {
        Self {
            vertex_count,
            instance_count: 1,
            first_vertex,
            first_instance: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_fixel_uniforms_size() {
        // 16 floats mvp + 3 floats colour + 7 scalars + 2 padding = 28 words = 112 bytes
        assert_eq!(size_of::<FixelUniforms>(), 112);
    }

    #[test]
    fn test_fixel_uniforms_offsets() {
        let u = FixelUniforms::default();
        let base = &u as *const _ as usize;
        assert_eq!(&u.const_colour as *const _ as usize - base, 64);
        assert_eq!(&u.line_length as *const _ as usize - base, 76);
        assert_eq!(&u.scale_line_length_by_value as *const _ as usize - base, 100);
    }

    #[test]
    fn test_draw_indirect_args_size() {
        assert_eq!(size_of::<DrawIndirectArgs>(), 16);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<FixelUniforms>(), 4);
        assert_eq!(std::mem::align_of::<DrawIndirectArgs>(), 4);
    }
}
