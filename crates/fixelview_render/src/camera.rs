//! Orbit camera around a fixel volume
//!
//! The camera circles a target point at a fixed distance. Yaw turns around
//! the scanner z axis, pitch tilts towards it.

use fixelview_math::mat4::{self, Mat4};
use fixelview_math::Vec3;

/// Model-view-projection handed to the renderer each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub mvp: Mat4,
}

impl Default for Projection {
    fn default() -> Self {
        Self { mvp: mat4::IDENTITY }
    }
}

/// Camera orbiting a target
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    yaw: f32,
    pitch: f32,
    start_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 100.0)
    }
}

impl OrbitCamera {
    /// Camera looking at `target` from `distance`
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            yaw: 0.0,
            pitch: 0.3,
            start_distance: distance,
        }
    }

    /// Rotate around the target; pitch stays clear of the poles
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
    }

    /// Scale the distance to the target
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).max(self.near * 2.0);
    }

    /// Back to the initial orientation and distance
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.3;
        self.distance = self.start_distance;
    }

    /// Eye position in scanner space
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, -cp * cy, sp) * self.distance
    }

    /// Projection for a viewport with the given aspect ratio
    pub fn projection(&self, aspect: f32) -> Projection {
        let view = mat4::look_at(self.eye(), self.target, Vec3::Z);
        let proj = mat4::perspective(self.fov_y, aspect, self.near, self.far);
        Projection {
            mvp: mat4::mul(proj, view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_distance() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 10.0);
        cam.orbit(0.7, -0.2);
        assert!(((cam.eye() - cam.target).length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10.0);
        assert!(cam.eye().z < cam.target.z + cam.distance);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let cam = OrbitCamera::new(Vec3::ZERO, 50.0);
        let clip = mat4::transform_point(cam.projection(1.0).mvp, Vec3::ZERO);
        assert!((clip[0] / clip[3]).abs() < 1e-5);
        assert!((clip[1] / clip[3]).abs() < 1e-5);
    }

    #[test]
    fn test_reset() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 20.0);
        let start = cam.eye();
        cam.orbit(1.0, 0.5);
        cam.zoom(0.5);
        cam.reset();
        assert_eq!(cam.eye(), start);
    }
}
