//! Fixel elements and voxels

use serde::{Serialize, Deserialize};

use fixelview_math::Vec3;

/// One directionally-resolved element within a voxel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixelElement {
    /// Unit direction of the fibre population
    pub dir: Vec3,
    /// Scalar associated with the direction (e.g. fibre density)
    pub value: f32,
}

impl FixelElement {
    /// Create a new element
    pub fn new(dir: Vec3, value: f32) -> Self {
        Self { dir, value }
    }

    /// Direction scaled by value, as stored in the vertex buffer
    #[inline]
    pub fn scaled_dir(&self) -> Vec3 {
        self.dir * self.value
    }
}

/// A grid cell holding zero or more fixels, in file order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixelVoxel {
    pub elements: Vec<FixelElement>,
}

impl FixelVoxel {
    /// Create an empty voxel
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the voxel holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element
    pub fn push(&mut self, element: FixelElement) {
        self.elements.push(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_dir() {
        let e = FixelElement::new(Vec3::new(0.0, 1.0, 0.0), 0.5);
        assert_eq!(e.scaled_dir(), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_voxel_push_keeps_order() {
        let mut v = FixelVoxel::new();
        assert!(v.is_empty());
        v.push(FixelElement::new(Vec3::X, 1.0));
        v.push(FixelElement::new(Vec3::Y, 2.0));
        assert_eq!(v.len(), 2);
        assert_eq!(v.elements[1].value, 2.0);
    }
}
