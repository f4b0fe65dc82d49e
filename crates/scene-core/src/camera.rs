//! Per-frame camera handed to the backend: the smoothed eye and look-at
//! point the engine derives from the page anchor and the pointer.

use crate::constants::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_MIN_ASPECT, CAMERA_NEAR};
use glam::{Mat4, Vec3};

/// Eye, look-at and lens for one frame. `aspect` follows the container and
/// is already clamped by [`viewport_aspect`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    /// Right-handed perspective with WebGPU depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Width over height for a possibly empty container. Never divides by zero
/// and never returns less than the minimum aspect.
#[inline]
pub fn viewport_aspect(width: u32, height: u32) -> f32 {
    (width as f32 / height.max(1) as f32).max(CAMERA_MIN_ASPECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_container_keeps_a_finite_aspect() {
        assert_eq!(viewport_aspect(0, 0), CAMERA_MIN_ASPECT);
        assert_eq!(viewport_aspect(800, 0), 800.0);
        assert_eq!(viewport_aspect(0, 600), CAMERA_MIN_ASPECT);
        assert!((viewport_aspect(1600, 900) - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_viewport_projection_is_finite() {
        let cam = Camera::new(Vec3::new(0.0, 0.6, 14.0), Vec3::ZERO, viewport_aspect(0, 0));
        let m = cam.projection_matrix() * cam.view_matrix();
        assert!(m.is_finite());
    }
}
