//! Fixed perspective camera looking down -Z at the ring stack.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Stationary camera on the ring axis
pub struct CameraSystem {
    eye: Vec3,
    target: Vec3,
    fov_degrees: f32,
    near_plane: f32,
    far_plane: f32,
}

impl CameraSystem {
    pub fn new(render_config: &RenderConfig) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, render_config.camera_distance),
            target: Vec3::ZERO,
            fov_degrees: render_config.fov_degrees,
            near_plane: render_config.near_plane,
            far_plane: render_config.far_plane,
        }
    }

    /// Create view-projection matrix for the given surface aspect ratio
    pub fn view_proj(&self, aspect_ratio: f32) -> Mat4 {
        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect_ratio.max(f32::EPSILON),
            self.near_plane,
            self.far_plane,
        );
        proj * view
    }
}
