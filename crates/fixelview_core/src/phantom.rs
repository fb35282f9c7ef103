//! Synthetic fixel volumes
//!
//! Used by the viewer when no volume file is configured, and handy in tests.

use fixelview_math::Vec3;

use crate::fixel::FixelElement;
use crate::volume::FixelVolume;

/// Two crossing fibre bundles
///
/// A bundle running along x fills the lower half of the volume in y, a second
/// one tilted in the y-z plane fills the upper two thirds in x. Where they
/// overlap voxels hold two fixels. Values fall off with distance from the
/// bundle axis, so colour maps have something to show.
pub fn crossing_fibres(dims: [usize; 3], voxel_size: [f32; 3]) -> FixelVolume {
    let mut volume = FixelVolume::new(dims, voxel_size);
    let tilted = Vec3::new(0.0, 1.0, 0.5).normalized();

    for k in 0..dims[2] {
        for j in 0..dims[1] {
            for i in 0..dims[0] {
                let u = normalised(i, dims[0]);
                let v = normalised(j, dims[1]);
                let w = normalised(k, dims[2]);

                if v < 0.5 {
                    let value = falloff(v - 0.25, w - 0.5);
                    push(&mut volume, [i, j, k], FixelElement::new(Vec3::X, value));
                }
                if u > 1.0 / 3.0 {
                    let value = falloff(u - 2.0 / 3.0, w - 0.5);
                    push(&mut volume, [i, j, k], FixelElement::new(tilted, value));
                }
            }
        }
    }

    volume
}

/// Index in [0, 1] across an axis
fn normalised(index: usize, dim: usize) -> f32 {
    if dim > 1 {
        index as f32 / (dim - 1) as f32
    } else {
        0.5
    }
}

fn falloff(a: f32, b: f32) -> f32 {
    (1.0 - 2.0 * (a * a + b * b).sqrt()).max(0.05)
}

fn push(volume: &mut FixelVolume, index: [usize; 3], element: FixelElement) {
    // indices come from the volume's own dims
    if let Err(e) = volume.push_element(index, element) {
        log::error!("Phantom generation skipped a fixel: {}", e);
    }
}
