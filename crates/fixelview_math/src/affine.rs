//! Voxel-to-scanner affine transform
//!
//! Image volumes store their geometry as a 3x4 affine mapping voxel indices
//! (i, j, k) to scanner-space millimetres. The last column is the translation.

use serde::{Serialize, Deserialize};

use crate::Vec3;

/// 3x4 affine transform, row-major: `rows[r] = [m_r0, m_r1, m_r2, t_r]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine3 {
    pub rows: [[f32; 4]; 3],
}

impl Default for Affine3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine3 {
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    /// Axis-aligned transform from voxel sizes and the scanner position of voxel (0, 0, 0)
    pub fn from_voxel_size(voxel_size: [f32; 3], origin: Vec3) -> Self {
        Self {
            rows: [
                [voxel_size[0], 0.0, 0.0, origin.x],
                [0.0, voxel_size[1], 0.0, origin.y],
                [0.0, 0.0, voxel_size[2], origin.z],
            ],
        }
    }

    /// Map a voxel index to its scanner-space centre
    #[inline]
    pub fn voxel_to_scanner(&self, index: [usize; 3]) -> Vec3 {
        let v = [index[0] as f32, index[1] as f32, index[2] as f32];
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v[0] + r[0][1] * v[1] + r[0][2] * v[2] + r[0][3],
            r[1][0] * v[0] + r[1][1] * v[1] + r[1][2] * v[2] + r[1][3],
            r[2][0] * v[0] + r[2][1] * v[1] + r[2][2] * v[2] + r[2][3],
        )
    }

    /// Translation part
    #[inline]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_maps_index_to_itself() {
        let p = Affine3::IDENTITY.voxel_to_scanner([2, 3, 4]);
        assert_eq!(p, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_voxel_size_and_origin() {
        let t = Affine3::from_voxel_size([2.0, 2.5, 3.0], Vec3::new(-10.0, 0.0, 5.0));
        assert_eq!(t.voxel_to_scanner([0, 0, 0]), Vec3::new(-10.0, 0.0, 5.0));
        assert_eq!(t.voxel_to_scanner([1, 2, 3]), Vec3::new(-8.0, 5.0, 14.0));
        assert_eq!(t.translation(), Vec3::new(-10.0, 0.0, 5.0));
    }

    #[test]
    fn test_oblique_rows() {
        let t = Affine3 {
            rows: [
                [0.0, 1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 1.0],
            ],
        };
        assert_eq!(t.voxel_to_scanner([1, 2, 3]), Vec3::new(2.0, 1.0, 4.0));
    }
}
