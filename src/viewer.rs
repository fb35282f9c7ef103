//! Fixel tool state driven by viewer actions
//!
//! Holds the tool settings and the (axis, slice) selector, applies
//! [`ViewerAction`]s to them and to the fixel image, and keeps the slice
//! inside the volume.

use fixelview_core::colourmap;
use fixelview_render::{FixelImage, FixelToolSettings, GpuContext, OrbitCamera};

use crate::config::{FixelConfig, ToolConfig};
use crate::input::ViewerAction;

/// What the frame loop should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Continue,
    Exit,
}

/// Tool settings plus the current slice selector
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub tool: FixelToolSettings,
    pub axis: usize,
    pub slice: usize,
    /// Orbit step in radians
    pub orbit_step: f32,
}

impl ViewerState {
    /// Start from the tool configuration, clamped to `image`
    pub fn from_config<G: GpuContext>(config: &ToolConfig, image: &FixelImage<G>, orbit_step_degrees: f32) -> Self {
        let axis = config.axis.min(2);
        let slice = config
            .slice
            .unwrap_or_else(|| image.slice_count(axis) / 2);
        let mut state = Self {
            tool: FixelToolSettings {
                crop_to_slice: config.crop_to_slice,
                line_opacity: config.line_opacity,
                line_thickness: config.line_thickness,
            },
            axis,
            slice,
            orbit_step: orbit_step_degrees.to_radians(),
        };
        state.clamp_slice(image);
        state
    }

    fn clamp_slice<G: GpuContext>(&mut self, image: &FixelImage<G>) {
        let count = image.slice_count(self.axis);
        self.slice = self.slice.min(count.saturating_sub(1));
    }

    /// Apply one action
    pub fn apply<G: GpuContext>(
        &mut self,
        action: ViewerAction,
        image: &mut FixelImage<G>,
        camera: &mut OrbitCamera,
    ) -> ActionOutcome {
        match action {
            ViewerAction::SelectAxis(axis) => {
                if axis != self.axis && axis < 3 {
                    self.axis = axis;
                    self.slice = image.slice_count(axis) / 2;
                }
            }
            ViewerAction::StepSlice(step) => {
                let count = image.slice_count(self.axis);
                if count > 0 {
                    self.slice = self
                        .slice
                        .saturating_add_signed(step as isize)
                        .min(count - 1);
                }
            }
            ViewerAction::ToggleCrop => {
                self.tool.crop_to_slice = !self.tool.crop_to_slice;
            }
            ViewerAction::CycleColourType => {
                image.colour_type = image.colour_type.next();
            }
            ViewerAction::CycleColourMap => {
                let next = (image.displayable.colourmap() + 1) % colourmap::count();
                if let Err(e) = image.displayable.set_colourmap(next) {
                    log::warn!("{}", e);
                }
            }
            ViewerAction::ToggleOpacity => {
                self.tool.line_opacity = if self.tool.line_opacity < 1.0 { 1.0 } else { 0.5 };
            }
            ViewerAction::ToggleScaleByValue => {
                image.scale_line_length_by_value = !image.scale_line_length_by_value;
            }
            ViewerAction::ScaleLineLength(factor) => {
                image.line_length_multiplier *= factor;
            }
            ViewerAction::Orbit(steps) => {
                camera.orbit(steps as f32 * self.orbit_step, 0.0);
            }
            ViewerAction::ResetCamera => {
                camera.reset();
            }
            ViewerAction::Exit => return ActionOutcome::Exit,
        }
        self.clamp_slice(image);
        ActionOutcome::Continue
    }

    /// One-line summary for the window title
    pub fn describe<G: GpuContext>(&self, image: &FixelImage<G>) -> String {
        let axis = ["X", "Y", "Z"].get(self.axis).copied().unwrap_or("?");
        let region = if self.tool.crop_to_slice {
            format!("{} slice {}/{}", axis, self.slice, image.slice_count(self.axis))
        } else {
            "whole volume".to_string()
        };
        format!(
            "{} | {:?} {} | opacity {:.1} | length x{:.2}",
            region,
            image.colour_type,
            image.shader_key().colour_map().name,
            self.tool.line_opacity,
            image.line_length_multiplier
        )
    }
}

/// Apply the display part of the fixel configuration to `image`
pub fn configure_image<G: GpuContext>(config: &FixelConfig, image: &mut FixelImage<G>) {
    image.colour_type = config.colour_type;
    image.colour = config.colour;
    image.line_length_multiplier = config.line_length_multiplier;
    image.scale_line_length_by_value = config.scale_line_length_by_value;
    image.displayable.set_use_discard_lower(config.discard_lower);
    image.displayable.set_use_discard_upper(config.discard_upper);
    image.displayable.set_invert_scale(config.invert_scale);

    match colourmap::index_of(&config.colourmap) {
        Some(index) => {
            if let Err(e) = image.displayable.set_colourmap(index) {
                log::warn!("{}", e);
            }
        }
        None => log::warn!(
            "Unknown colour map '{}', keeping {}",
            config.colourmap,
            image.shader_key().colour_map().name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use fixelview_core::{phantom, ColourType};
    use fixelview_render::RecordingGpu;

    fn image() -> FixelImage<RecordingGpu> {
        let volume = phantom::crossing_fibres([8, 6, 4], [1.0, 1.0, 1.0]);
        FixelImage::new(Rc::new(RecordingGpu::new()), "phantom", &volume)
    }

    #[test]
    fn test_from_config_uses_middle_slice() {
        let img = image();
        let state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);
        assert_eq!(state.axis, 2);
        assert_eq!(state.slice, 2);
        assert!(state.tool.crop_to_slice);
    }

    #[test]
    fn test_configured_slice_is_clamped() {
        let img = image();
        let config = ToolConfig { axis: 0, slice: Some(100), ..Default::default() };
        let state = ViewerState::from_config(&config, &img, 5.0);
        assert_eq!(state.slice, 7);
    }

    #[test]
    fn test_step_slice_stays_in_range() {
        let mut img = image();
        let mut camera = OrbitCamera::default();
        let mut state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);
        for _ in 0..10 {
            state.apply(ViewerAction::StepSlice(1), &mut img, &mut camera);
        }
        assert_eq!(state.slice, 3);
        for _ in 0..10 {
            state.apply(ViewerAction::StepSlice(-1), &mut img, &mut camera);
        }
        assert_eq!(state.slice, 0);
    }

    #[test]
    fn test_select_axis_recentres() {
        let mut img = image();
        let mut camera = OrbitCamera::default();
        let mut state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);
        state.apply(ViewerAction::SelectAxis(0), &mut img, &mut camera);
        assert_eq!((state.axis, state.slice), (0, 4));
    }

    #[test]
    fn test_toggles() {
        let mut img = image();
        let mut camera = OrbitCamera::default();
        let mut state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);

        state.apply(ViewerAction::ToggleOpacity, &mut img, &mut camera);
        assert_eq!(state.tool.line_opacity, 0.5);
        state.apply(ViewerAction::ToggleOpacity, &mut img, &mut camera);
        assert_eq!(state.tool.line_opacity, 1.0);

        state.apply(ViewerAction::ToggleCrop, &mut img, &mut camera);
        assert!(!state.tool.crop_to_slice);

        state.apply(ViewerAction::CycleColourType, &mut img, &mut camera);
        assert_eq!(img.colour_type, ColourType::Direction);

        state.apply(ViewerAction::CycleColourMap, &mut img, &mut camera);
        assert_eq!(img.displayable.colourmap(), colourmap::DEFAULT_MAP + 1);
        assert!(img.need_update());
    }

    #[test]
    fn test_colour_map_cycle_wraps() {
        let mut img = image();
        let mut camera = OrbitCamera::default();
        let mut state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);
        for _ in 0..colourmap::count() {
            state.apply(ViewerAction::CycleColourMap, &mut img, &mut camera);
        }
        assert_eq!(img.displayable.colourmap(), colourmap::DEFAULT_MAP);
    }

    #[test]
    fn test_exit() {
        let mut img = image();
        let mut camera = OrbitCamera::default();
        let mut state = ViewerState::from_config(&ToolConfig::default(), &img, 5.0);
        assert_eq!(state.apply(ViewerAction::Exit, &mut img, &mut camera), ActionOutcome::Exit);
    }

    #[test]
    fn test_configure_image() {
        let mut img = image();
        let config = FixelConfig {
            colourmap: "gray".to_string(),
            discard_lower: true,
            invert_scale: true,
            line_length_multiplier: 2.0,
            colour_type: ColourType::Colour,
            ..Default::default()
        };
        configure_image(&config, &mut img);
        assert_eq!(img.displayable.colourmap(), 0);
        assert!(img.displayable.use_discard_lower());
        assert!(img.displayable.scale_inverted());
        assert_eq!(img.line_length_multiplier, 2.0);
        assert_eq!(img.colour_type, ColourType::Colour);
    }

    #[test]
    fn test_unknown_colour_map_keeps_default() {
        let mut img = image();
        let config = FixelConfig { colourmap: "plasma".to_string(), ..Default::default() };
        configure_image(&config, &mut img);
        assert_eq!(img.displayable.colourmap(), colourmap::DEFAULT_MAP);
    }
}
