//! Fixel tessellation
//!
//! Walks a [`FixelSource`] once and produces:
//!
//! - a flat vertex buffer: a leading sentinel, then per fixel the voxel's
//!   scanner position followed by `dir * value`, then a trailing sentinel
//! - one [`SlicePartition`] per axis, mapping each slice to the draw ranges of
//!   the fixels lying in it
//! - the observed value range
//!
//! Each fixel is drawn as 2 vertices starting at the slot *before* its
//! position. With `pos` read one slot ahead, `prev` at the slot itself and
//! `next` two slots ahead, the even vertex sees (centre, dir) in (pos, next)
//! and the odd vertex sees (centre, dir) in (prev, pos), so both rays of a
//! segment come out of a single stored direction.

use fixelview_math::Vec3;

use crate::volume::FixelSource;

/// Vertices per drawn segment
pub const SEGMENT_VERTEX_COUNT: u32 = 2;

/// Draw ranges for the fixels in one slice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceBucket {
    /// First vertex of each segment
    pub firsts: Vec<u32>,
    /// Vertex count of each segment (always [`SEGMENT_VERTEX_COUNT`])
    pub counts: Vec<u32>,
    /// Number of segments registered here
    pub count: u32,
}

impl SliceBucket {
    /// Register one segment starting at `first`
    pub fn push(&mut self, first: u32) {
        self.firsts.push(first);
        self.counts.push(SEGMENT_VERTEX_COUNT);
        self.count += 1;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Per-slice buckets along one axis
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlicePartition {
    buckets: Vec<SliceBucket>,
}

impl SlicePartition {
    /// One empty bucket per slice
    pub fn new(slices: usize) -> Self {
        Self {
            buckets: vec![SliceBucket::default(); slices],
        }
    }

    /// Number of slices
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, slice: usize) -> Option<&SliceBucket> {
        self.buckets.get(slice)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SliceBucket> {
        self.buckets.iter()
    }

    /// Segments registered across all slices
    pub fn total_count(&self) -> u32 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// All buckets joined in slice order
    pub fn concatenate(&self) -> SliceBucket {
        let total = self.total_count() as usize;
        let mut joined = SliceBucket {
            firsts: Vec::with_capacity(total),
            counts: Vec::with_capacity(total),
            count: 0,
        };
        for bucket in &self.buckets {
            joined.firsts.extend_from_slice(&bucket.firsts);
            joined.counts.extend_from_slice(&bucket.counts);
            joined.count += bucket.count;
        }
        joined
    }

    fn bucket_mut(&mut self, slice: usize) -> &mut SliceBucket {
        &mut self.buckets[slice]
    }
}

/// Tessellated fixel field
#[derive(Clone, Debug)]
pub struct FixelGeometry {
    /// Sentinel-framed (position, dir * value) pairs
    pub vertices: Vec<Vec3>,
    /// One partition per spatial axis
    pub partitions: [SlicePartition; 3],
    /// Axis-0 partition joined across slices; covers every segment once
    whole_volume: SliceBucket,
    /// Observed value range; `value_max < value_min` when there are no fixels
    pub value_min: f32,
    pub value_max: f32,
    element_count: usize,
    /// 0.45 of the mean voxel size
    default_line_length: f32,
}

impl FixelGeometry {
    /// Tessellate a fixel volume
    pub fn tessellate<S: FixelSource + ?Sized>(source: &S) -> Self {
        let dims = source.dims();
        let voxel_size = source.voxel_size();
        let transform = source.transform();

        let mut partitions = [
            SlicePartition::new(dims[0]),
            SlicePartition::new(dims[1]),
            SlicePartition::new(dims[2]),
        ];
        let mut vertices = vec![Vec3::ZERO];
        let mut value_min = f32::INFINITY;
        let mut value_max = f32::NEG_INFINITY;
        let mut element_count = 0usize;

        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let index = [i, j, k];
                    let elements = source.elements(index);
                    if elements.is_empty() {
                        continue;
                    }
                    let position = transform.voxel_to_scanner(index);
                    for element in elements {
                        value_min = value_min.min(element.value);
                        value_max = value_max.max(element.value);

                        let first = (vertices.len() - 1) as u32;
                        for (axis, partition) in partitions.iter_mut().enumerate() {
                            partition.bucket_mut(index[axis]).push(first);
                        }

                        vertices.push(position);
                        vertices.push(element.scaled_dir());
                        element_count += 1;
                    }
                }
            }
        }
        vertices.push(Vec3::ZERO);

        debug_assert_eq!(vertices.len(), 2 + 2 * element_count);
        debug_assert!(partitions
            .iter()
            .all(|p| p.total_count() as usize == element_count));

        let whole_volume = partitions[0].concatenate();
        let default_line_length =
            0.45 * (voxel_size[0] + voxel_size[1] + voxel_size[2]) / 3.0;

        log::debug!(
            "Tessellated {} fixels over {:?} voxels into {} vertices",
            element_count,
            dims,
            vertices.len()
        );

        Self {
            vertices,
            partitions,
            whole_volume,
            value_min,
            value_max,
            element_count,
            default_line_length,
        }
    }

    /// Number of fixel elements (= drawn segments)
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Whether no fixel was found
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Observed value range, `None` when there are no fixels
    pub fn value_range(&self) -> Option<(f32, f32)> {
        if self.value_max >= self.value_min {
            Some((self.value_min, self.value_max))
        } else {
            None
        }
    }

    /// Segment length derived from voxel geometry
    #[inline]
    pub fn default_line_length(&self) -> f32 {
        self.default_line_length
    }

    /// Draw ranges covering the whole volume
    #[inline]
    pub fn whole_volume(&self) -> &SliceBucket {
        &self.whole_volume
    }

    /// Draw ranges for one (axis, slice), `None` when out of range
    pub fn slice(&self, axis: usize, slice: usize) -> Option<&SliceBucket> {
        self.partitions.get(axis)?.bucket(slice)
    }
}
