//! Fixel volumes
//!
//! [`FixelSource`] is the contract a volume reader fulfils; the tessellator only
//! ever talks to that trait. [`FixelVolume`] is the in-memory implementation,
//! built programmatically or loaded from a RON file.

use serde::{Serialize, Deserialize};
use std::fs;
use std::io;
use std::path::Path;

use fixelview_math::{Affine3, Vec3};

use crate::fixel::{FixelElement, FixelVoxel};

/// A three-dimensional grid where every voxel yields zero or more fixels
pub trait FixelSource {
    /// Number of voxels along each spatial axis
    fn dims(&self) -> [usize; 3];

    /// Voxel spacing along each spatial axis
    fn voxel_size(&self) -> [f32; 3];

    /// Voxel index to scanner-space transform
    fn transform(&self) -> &Affine3;

    /// Elements stored at a voxel, in file order
    fn elements(&self, index: [usize; 3]) -> &[FixelElement];
}

/// Dense in-memory fixel volume, voxels stored x-fastest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixelVolume {
    dims: [usize; 3],
    voxel_size: [f32; 3],
    #[serde(default)]
    transform: Affine3,
    voxels: Vec<FixelVoxel>,
}

impl FixelVolume {
    /// Create an empty volume with an axis-aligned transform centred on the grid
    pub fn new(dims: [usize; 3], voxel_size: [f32; 3]) -> Self {
        let origin = Vec3::new(
            -0.5 * voxel_size[0] * dims[0].saturating_sub(1) as f32,
            -0.5 * voxel_size[1] * dims[1].saturating_sub(1) as f32,
            -0.5 * voxel_size[2] * dims[2].saturating_sub(1) as f32,
        );
        Self {
            dims,
            voxel_size,
            transform: Affine3::from_voxel_size(voxel_size, origin),
            voxels: vec![FixelVoxel::new(); dims[0] * dims[1] * dims[2]],
        }
    }

    /// Replace the voxel-to-scanner transform
    pub fn with_transform(mut self, transform: Affine3) -> Self {
        self.transform = transform;
        self
    }

    /// Flat storage offset of a voxel index
    #[inline]
    fn offset(&self, index: [usize; 3]) -> Option<usize> {
        if index.iter().zip(self.dims.iter()).any(|(i, d)| i >= d) {
            return None;
        }
        Some(index[0] + self.dims[0] * (index[1] + self.dims[1] * index[2]))
    }

    /// Append an element to the voxel at `index`
    pub fn push_element(&mut self, index: [usize; 3], element: FixelElement) -> Result<(), VolumeError> {
        let offset = self.offset(index).ok_or(VolumeError::IndexOutOfBounds {
            index,
            dims: self.dims,
        })?;
        self.voxels[offset].push(element);
        Ok(())
    }

    /// Voxel at `index`, if inside the grid
    pub fn voxel(&self, index: [usize; 3]) -> Option<&FixelVoxel> {
        self.offset(index).map(|o| &self.voxels[o])
    }

    /// Total number of fixel elements across all voxels
    pub fn element_count(&self) -> usize {
        self.voxels.iter().map(FixelVoxel::len).sum()
    }

    /// Check that the voxel list matches the dimensions
    pub fn validate(&self) -> Result<(), VolumeError> {
        let expected = self.dims[0] * self.dims[1] * self.dims[2];
        if self.voxels.len() != expected {
            return Err(VolumeError::ShapeMismatch {
                expected,
                found: self.voxels.len(),
            });
        }
        Ok(())
    }

    /// Load a volume from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a volume from RON text
    pub fn from_ron_str(contents: &str) -> Result<Self, VolumeError> {
        let volume: Self = ron::from_str(contents)?;
        volume.validate()?;
        Ok(volume)
    }

    /// Save the volume to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VolumeError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl FixelSource for FixelVolume {
    fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn voxel_size(&self) -> [f32; 3] {
        self.voxel_size
    }

    fn transform(&self) -> &Affine3 {
        &self.transform
    }

    fn elements(&self, index: [usize; 3]) -> &[FixelElement] {
        self.voxel(index).map(|v| v.elements.as_slice()).unwrap_or(&[])
    }
}

/// Error building, loading or saving a volume
#[derive(Debug)]
pub enum VolumeError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// Voxel list length does not match the dimensions
    ShapeMismatch { expected: usize, found: usize },
    /// Voxel index outside the grid
    IndexOutOfBounds { index: [usize; 3], dims: [usize; 3] },
}

impl From<io::Error> for VolumeError {
    fn from(e: io::Error) -> Self {
        VolumeError::Io(e)
    }
}

impl From<ron::error::SpannedError> for VolumeError {
    fn from(e: ron::error::SpannedError) -> Self {
        VolumeError::Parse(e)
    }
}

impl From<ron::Error> for VolumeError {
    fn from(e: ron::Error) -> Self {
        VolumeError::Serialize(e)
    }
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeError::Io(e) => write!(f, "IO error: {}", e),
            VolumeError::Parse(e) => write!(f, "Parse error: {}", e),
            VolumeError::Serialize(e) => write!(f, "Serialize error: {}", e),
            VolumeError::ShapeMismatch { expected, found } => {
                write!(f, "Volume has {} voxels, dimensions require {}", found, expected)
            }
            VolumeError::IndexOutOfBounds { index, dims } => {
                write!(f, "Voxel {:?} outside volume of size {:?}", index, dims)
            }
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VolumeError::Io(e) => Some(e),
            VolumeError::Parse(e) => Some(e),
            VolumeError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}
