//! Input mapping from raw key events to viewer actions

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Viewer actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    /// Slice along the given axis (X, Y, Z keys)
    SelectAxis(usize),
    /// Move the slice by +1 / -1 (Up, Down)
    StepSlice(i32),
    /// Toggle crop-to-slice (C)
    ToggleCrop,
    /// Cycle direction / colour / value colouring (M)
    CycleColourType,
    /// Cycle the colour map (K)
    CycleColourMap,
    /// Toggle line opacity between 1.0 and 0.5 (O)
    ToggleOpacity,
    /// Toggle scaling segment length by value (L)
    ToggleScaleByValue,
    /// Multiply the line length multiplier ([ and ])
    ScaleLineLength(f32),
    /// Orbit by +1 / -1 steps (Left, Right)
    Orbit(i32),
    /// Reset the camera (R)
    ResetCamera,
    /// Exit application (Escape)
    Exit,
}

/// Maps raw key events to viewer actions
pub struct InputMapper;

impl InputMapper {
    /// Map a key event to an action
    ///
    /// Returns `None` for releases and unbound keys
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<ViewerAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::KeyX => Some(ViewerAction::SelectAxis(0)),
            KeyCode::KeyY => Some(ViewerAction::SelectAxis(1)),
            KeyCode::KeyZ => Some(ViewerAction::SelectAxis(2)),
            KeyCode::ArrowUp => Some(ViewerAction::StepSlice(1)),
            KeyCode::ArrowDown => Some(ViewerAction::StepSlice(-1)),
            KeyCode::KeyC => Some(ViewerAction::ToggleCrop),
            KeyCode::KeyM => Some(ViewerAction::CycleColourType),
            KeyCode::KeyK => Some(ViewerAction::CycleColourMap),
            KeyCode::KeyO => Some(ViewerAction::ToggleOpacity),
            KeyCode::KeyL => Some(ViewerAction::ToggleScaleByValue),
            KeyCode::BracketLeft => Some(ViewerAction::ScaleLineLength(1.0 / 1.25)),
            KeyCode::BracketRight => Some(ViewerAction::ScaleLineLength(1.25)),
            KeyCode::ArrowLeft => Some(ViewerAction::Orbit(-1)),
            KeyCode::ArrowRight => Some(ViewerAction::Orbit(1)),
            KeyCode::KeyR => Some(ViewerAction::ResetCamera),
            KeyCode::Escape => Some(ViewerAction::Exit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_keys() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::KeyX, ElementState::Pressed),
            Some(ViewerAction::SelectAxis(0))
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::KeyZ, ElementState::Pressed),
            Some(ViewerAction::SelectAxis(2))
        );
    }

    #[test]
    fn test_key_release_ignored() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Released);
        assert_eq!(action, None);
    }

    #[test]
    fn test_unbound_keys_not_mapped() {
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::Space] {
            let action = InputMapper::map_keyboard(key, ElementState::Pressed);
            assert_eq!(action, None, "Key {:?} should not be mapped", key);
        }
    }

    #[test]
    fn test_line_length_keys_are_inverse() {
        let (Some(ViewerAction::ScaleLineLength(down)), Some(ViewerAction::ScaleLineLength(up))) = (
            InputMapper::map_keyboard(KeyCode::BracketLeft, ElementState::Pressed),
            InputMapper::map_keyboard(KeyCode::BracketRight, ElementState::Pressed),
        ) else {
            panic!("bracket keys should scale the line length");
        };
        assert!((down * up - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_escape_exits() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed),
            Some(ViewerAction::Exit)
        );
    }
}
