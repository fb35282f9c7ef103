//! Blend and depth state for line drawing
//!
//! Translucent lines are drawn with additive constant-alpha blending and no
//! depth test or depth writes. Everything else draws opaque and depth tested.
//! [`RenderStateGuard`] restores [`RenderState::OPAQUE`] when it goes out of
//! scope, so a draw cannot leak its state to whatever is drawn next.

use crate::gpu::GpuContext;

/// Pipeline state applied around a draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    /// Constant alpha for additive blending; `None` draws opaque
    pub blend_alpha: Option<f32>,
    pub depth_test: bool,
    pub depth_write: bool,
    pub line_width: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl RenderState {
    /// Opaque, depth tested, depth written, 1px lines
    pub const OPAQUE: Self = Self {
        blend_alpha: None,
        depth_test: true,
        depth_write: true,
        line_width: 1.0,
    };

    /// State for drawing lines at `opacity` with `thickness`
    pub fn for_lines(opacity: f32, thickness: f32) -> Self {
        if opacity < 1.0 {
            Self {
                blend_alpha: Some(opacity.max(0.0)),
                depth_test: false,
                depth_write: false,
                line_width: thickness,
            }
        } else {
            Self {
                line_width: thickness,
                ..Self::OPAQUE
            }
        }
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.blend_alpha.is_some()
    }
}

/// Applies a [`RenderState`] and restores [`RenderState::OPAQUE`] on drop
pub struct RenderStateGuard<'a, G: GpuContext + ?Sized> {
    gpu: &'a G,
}

impl<'a, G: GpuContext + ?Sized> RenderStateGuard<'a, G> {
    pub fn apply(gpu: &'a G, state: RenderState) -> Self {
        gpu.set_render_state(&state);
        Self { gpu }
    }
}

impl<G: GpuContext + ?Sized> Drop for RenderStateGuard<'_, G> {
    fn drop(&mut self) {
        self.gpu.set_render_state(&RenderState::OPAQUE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GpuCall, RecordingGpu};

    #[test]
    fn test_full_opacity_is_opaque() {
        let s = RenderState::for_lines(1.0, 2.0);
        assert!(!s.is_translucent());
        assert!(s.depth_test && s.depth_write);
        assert_eq!(s.line_width, 2.0);
    }

    #[test]
    fn test_partial_opacity_blends() {
        let s = RenderState::for_lines(0.5, 1.0);
        assert_eq!(s.blend_alpha, Some(0.5));
        assert!(!s.depth_test);
        assert!(!s.depth_write);
    }

    #[test]
    fn test_guard_restores_opaque() {
        let gpu = RecordingGpu::new();
        {
            let _guard = RenderStateGuard::apply(&gpu, RenderState::for_lines(0.25, 3.0));
        }
        let states = gpu.render_states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].blend_alpha, Some(0.25));
        assert_eq!(states[1], RenderState::OPAQUE);
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let gpu = RecordingGpu::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = RenderStateGuard::apply(&gpu, RenderState::for_lines(0.5, 1.0));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(
            gpu.calls().last(),
            Some(&GpuCall::SetRenderState(RenderState::OPAQUE))
        );
    }
}
