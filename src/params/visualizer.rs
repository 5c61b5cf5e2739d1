//! Ring visualizer parameters.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::rings::Rgb;

/// Per-tick configuration snapshot read by the smoother, the frame source and
/// the ring generator. The pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    /// Color of the innermost ring; outer rings are shifted slightly darker
    pub base_color: Rgb,

    /// Displacement gain for the innermost ring (dimensionless, > 0)
    /// Outer rings scale it down linearly to zero.
    pub sensitivity: f32,

    /// Number of rings = number of history frames kept (>= 1)
    pub ring_count: usize,

    /// Radius added per ring index (scene units, >= 0)
    pub ring_spacing: f32,

    /// Radius of the innermost ring at rest (scene units, > 0)
    pub base_radius: f32,

    /// Radius displacement at full-scale magnitude (scene units, >= 0)
    pub wave_amplitude: f32,

    /// Temporal smoothing of the spectrum across ticks (0..1)
    /// Consumed by the frame source, not by the ring pipeline.
    pub smoothing_time_constant: f32,

    /// Spatial smoothing across neighbouring bins (0..1, 0 = off)
    pub waveform_smoothing: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            base_color: Rgb::from_hex_u32(0x00ffff), // Cyan
            sensitivity: 3.8,
            ring_count: 12,
            ring_spacing: 0.05,
            base_radius: 0.48,
            wave_amplitude: 0.10,
            smoothing_time_constant: 0.8,
            waveform_smoothing: 0.8, // Heavy smoothing keeps the outline soft
        }
    }
}

impl VisualizerConfig {
    /// Reject values the ring pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ring_count == 0 {
            return Err(ConfigError::RingCount(self.ring_count));
        }
        if !(self.base_radius > 0.0) {
            return Err(ConfigError::BaseRadius(self.base_radius));
        }
        if !(self.sensitivity > 0.0) {
            return Err(ConfigError::Sensitivity(self.sensitivity));
        }
        if !(self.ring_spacing >= 0.0) {
            return Err(ConfigError::RingSpacing(self.ring_spacing));
        }
        if !(self.wave_amplitude >= 0.0) {
            return Err(ConfigError::WaveAmplitude(self.wave_amplitude));
        }
        check_unit("smoothing_time_constant", self.smoothing_time_constant)?;
        check_unit("waveform_smoothing", self.waveform_smoothing)?;
        Ok(())
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Smoothing { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(VisualizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_rings() {
        let config = VisualizerConfig {
            ring_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::RingCount(0))));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let config = VisualizerConfig {
            base_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseRadius(_))));

        let config = VisualizerConfig {
            base_radius: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseRadius(_))));
    }

    #[test]
    fn test_rejects_smoothing_out_of_range() {
        let config = VisualizerConfig {
            waveform_smoothing: 1.5,
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::Smoothing { name, value }) => {
                assert_eq!(name, "waveform_smoothing");
                assert_eq!(value, 1.5);
            }
            other => panic!("expected smoothing error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_spacing_and_amplitude_allowed() {
        let config = VisualizerConfig {
            ring_spacing: 0.0,
            wave_amplitude: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
