//! Windowing and threshold state shared by displayable images
//!
//! The windowing is stored as a midpoint and a range; shaders consume it as
//! `offset` (window minimum) and `scale` (inverse range) so that
//! `scale * (value - offset)` lands in [0, 1] inside the window.

use bitflags::bitflags;

use crate::colourmap::{self, UnknownColourMap};

bitflags! {
    /// Display switches that change the generated shader
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DisplayFlags: u8 {
        /// Discard values below the lower threshold
        const DISCARD_LOWER = 1 << 0;
        /// Discard values above the upper threshold
        const DISCARD_UPPER = 1 << 1;
        /// Invert the colour map
        const SCALE_INVERTED = 1 << 2;
    }
}

/// Base state of anything drawn with a windowed colour map
#[derive(Clone, Debug)]
pub struct Displayable {
    pub name: String,
    /// Observed data range; `value_max < value_min` means no data
    pub value_min: f32,
    pub value_max: f32,
    display_midpoint: f32,
    display_range: f32,
    /// Lower clip threshold
    pub lessthan: f32,
    /// Upper clip threshold
    pub greaterthan: f32,
    flags: DisplayFlags,
    colourmap: usize,
}

impl Displayable {
    /// Create with an empty value range and a unit window
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_min: f32::INFINITY,
            value_max: f32::NEG_INFINITY,
            display_midpoint: 0.5,
            display_range: 1.0,
            lessthan: f32::NEG_INFINITY,
            greaterthan: f32::INFINITY,
            flags: DisplayFlags::empty(),
            colourmap: 0,
        }
    }

    /// Whether any value has been observed
    pub fn has_values(&self) -> bool {
        self.value_max >= self.value_min
    }

    /// Set the window to span `[min, max]`
    pub fn set_windowing(&mut self, min: f32, max: f32) {
        self.display_range = max - min;
        self.display_midpoint = 0.5 * (min + max);
    }

    /// Restore the window to the observed value range
    pub fn reset_windowing(&mut self) {
        if self.has_values() {
            self.set_windowing(self.value_min, self.value_max);
        }
    }

    /// Drag-style window adjustment: `dx` shifts the midpoint, `dy` scales the range
    pub fn adjust_windowing(&mut self, dx: f32, dy: f32) {
        self.display_midpoint -= 0.0005 * self.display_range * dx;
        self.display_range *= (-0.002 * dy).exp();
    }

    pub fn display_midpoint(&self) -> f32 {
        self.display_midpoint
    }

    pub fn display_range(&self) -> f32 {
        self.display_range
    }

    /// Window minimum
    pub fn offset(&self) -> f32 {
        self.display_midpoint - 0.5 * self.display_range
    }

    /// Inverse window width; 1.0 for a degenerate window
    pub fn scale(&self) -> f32 {
        if self.display_range > 0.0 {
            1.0 / self.display_range
        } else {
            1.0
        }
    }

    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    pub fn use_discard_lower(&self) -> bool {
        self.flags.contains(DisplayFlags::DISCARD_LOWER)
    }

    pub fn use_discard_upper(&self) -> bool {
        self.flags.contains(DisplayFlags::DISCARD_UPPER)
    }

    pub fn scale_inverted(&self) -> bool {
        self.flags.contains(DisplayFlags::SCALE_INVERTED)
    }

    pub fn set_use_discard_lower(&mut self, on: bool) {
        self.flags.set(DisplayFlags::DISCARD_LOWER, on);
    }

    pub fn set_use_discard_upper(&mut self, on: bool) {
        self.flags.set(DisplayFlags::DISCARD_UPPER, on);
    }

    pub fn set_invert_scale(&mut self, on: bool) {
        self.flags.set(DisplayFlags::SCALE_INVERTED, on);
    }

    pub fn colourmap(&self) -> usize {
        self.colourmap
    }

    /// Select a colour map by id
    pub fn set_colourmap(&mut self, index: usize) -> Result<(), UnknownColourMap> {
        if colourmap::get(index).is_none() {
            return Err(UnknownColourMap(index));
        }
        self.colourmap = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_empty_range() {
        let d = Displayable::new("test");
        assert!(!d.has_values());
        assert!(d.value_max < d.value_min);
    }

    #[test]
    fn test_windowing_offset_scale() {
        let mut d = Displayable::new("test");
        d.set_windowing(2.0, 6.0);
        assert_eq!(d.display_midpoint(), 4.0);
        assert_eq!(d.display_range(), 4.0);
        assert_eq!(d.offset(), 2.0);
        assert_eq!(d.scale(), 0.25);
    }

    #[test]
    fn test_degenerate_window_scale() {
        let mut d = Displayable::new("test");
        d.set_windowing(3.0, 3.0);
        assert_eq!(d.scale(), 1.0);
        assert_eq!(d.offset(), 3.0);
    }

    #[test]
    fn test_adjust_and_reset() {
        let mut d = Displayable::new("test");
        d.value_min = 0.0;
        d.value_max = 1.0;
        d.reset_windowing();
        d.adjust_windowing(100.0, 0.0);
        assert!((d.display_midpoint() - 0.45).abs() < 1e-6);
        d.adjust_windowing(0.0, 500.0);
        assert!(d.display_range() < 1.0);
        d.reset_windowing();
        assert_eq!(d.offset(), 0.0);
        assert_eq!(d.display_range(), 1.0);
    }

    #[test]
    fn test_flags() {
        let mut d = Displayable::new("test");
        d.set_use_discard_lower(true);
        d.set_invert_scale(true);
        assert!(d.use_discard_lower());
        assert!(!d.use_discard_upper());
        assert!(d.scale_inverted());
        assert_eq!(d.flags(), DisplayFlags::DISCARD_LOWER | DisplayFlags::SCALE_INVERTED);
        d.set_use_discard_lower(false);
        assert!(!d.use_discard_lower());
    }

    #[test]
    fn test_set_colourmap() {
        let mut d = Displayable::new("test");
        assert!(d.set_colourmap(3).is_ok());
        assert_eq!(d.colourmap(), 3);
        assert_eq!(d.set_colourmap(99), Err(UnknownColourMap(99)));
        assert_eq!(d.colourmap(), 3);
    }
}
