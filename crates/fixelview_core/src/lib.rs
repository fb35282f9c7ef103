//! Core types for the fixelview renderer
//!
//! This crate turns a sparse fixel volume into draw-ready geometry:
//!
//! - [`FixelElement`] / [`FixelVoxel`] - direction and value pairs per voxel
//! - [`FixelSource`] - what a volume reader has to provide
//! - [`FixelVolume`] - in-memory volume, loadable from RON
//! - [`Displayable`] - windowing, thresholds and colour map selection
//! - [`ColourMap`] - shader colour formulas indexed by id
//! - [`FixelGeometry`] - vertex buffer plus per-axis slice partitions

mod fixel;
mod volume;
mod displayable;
pub mod colourmap;
pub mod phantom;
pub mod tessellator;

pub use fixel::{FixelElement, FixelVoxel};
pub use volume::{FixelSource, FixelVolume, VolumeError};
pub use displayable::{Displayable, DisplayFlags};
pub use colourmap::{ColourMap, ColourType, UnknownColourMap};
pub use tessellator::{FixelGeometry, SliceBucket, SlicePartition, SEGMENT_VERTEX_COUNT};

pub use fixelview_math::{Vec3, Affine3};
