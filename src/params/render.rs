//! Rendering configuration.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::rings::Rgb;

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Camera distance from the ring plane along +Z (scene units)
    pub camera_distance: f32,

    /// Near clipping plane (scene units)
    pub near_plane: f32,

    /// Far clipping plane (scene units)
    pub far_plane: f32,

    /// Clear color behind the rings
    pub background: Rgb,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            fov_degrees: 55.0,
            camera_distance: 1.5,
            near_plane: 0.1,
            far_plane: 100.0,
            background: Rgb::from_hex_u32(0xfafafa),
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// Validate window and camera parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, value| Err(ConfigError::Render { name, value });

        if self.window_width == 0 {
            return invalid("window_width", 0.0);
        }
        if self.window_height == 0 {
            return invalid("window_height", 0.0);
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid("fov_degrees", self.fov_degrees);
        }
        if !(self.near_plane > 0.0) {
            return invalid("near_plane", self.near_plane);
        }
        if !(self.far_plane > self.near_plane) {
            return invalid("far_plane", self.far_plane);
        }
        if !(self.camera_distance > self.near_plane && self.camera_distance < self.far_plane) {
            return invalid("camera_distance", self.camera_distance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_rejects_bad_camera() {
        let config = RenderConfig {
            fov_degrees: 180.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Render {
                name: "fov_degrees",
                ..
            })
        ));

        // Rings at the origin would be clipped
        let config = RenderConfig {
            camera_distance: 0.05,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_window() {
        let config = RenderConfig {
            window_height: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
