//! Live adjustments to the visualizer configuration.
//!
//! Each control nudges one field by a fixed step within its slider range.
//! Values already outside a range (set from the command line) are never
//! pulled back into it by a step in the opposite direction.

use crate::params::{RenderConfig, VisualizerConfig};
use crate::rings::Rgb;

/// Swatches cycled by `Control::NextColor`
pub const COLOR_PRESETS: [u32; 6] = [0x00ffff, 0xff00ff, 0xffff00, 0xff4444, 0x44ff44, 0xffffff];

pub const SENSITIVITY_RANGE: (f32, f32) = (0.1, 5.0);
pub const SENSITIVITY_STEP: f32 = 0.1;
pub const WAVE_SMOOTHING_RANGE: (f32, f32) = (0.0, 0.95);
pub const WAVE_SMOOTHING_STEP: f32 = 0.05;
pub const TIME_DECAY_RANGE: (f32, f32) = (0.1, 0.99);
pub const TIME_DECAY_STEP: f32 = 0.01;
pub const RING_COUNT_RANGE: (usize, usize) = (5, 50);
pub const SPACING_RANGE: (f32, f32) = (0.001, 0.2);
pub const SPACING_STEP: f32 = 0.001;
pub const RADIUS_RANGE: (f32, f32) = (0.05, 1.0);
pub const RADIUS_STEP: f32 = 0.01;
pub const AMPLITUDE_RANGE: (f32, f32) = (0.01, 0.5);
pub const AMPLITUDE_STEP: f32 = 0.01;

/// Light theme background
pub const LIGHT_BACKGROUND: u32 = 0xfafafa;
/// Dark theme background
pub const DARK_BACKGROUND: u32 = 0x000000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    SensitivityUp,
    SensitivityDown,
    MoreRings,
    FewerRings,
    WaveSmoothingUp,
    WaveSmoothingDown,
    TimeDecayUp,
    TimeDecayDown,
    SpacingUp,
    SpacingDown,
    RadiusUp,
    RadiusDown,
    AmplitudeUp,
    AmplitudeDown,
    NextColor,
}

/// What a control changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Unchanged,
    /// Takes effect on the next tick
    Updated,
    /// Ring count changed; history and renderer must be resized
    Resized,
}

/// Apply `control` to `config`.
pub fn apply(config: &mut VisualizerConfig, control: Control) -> Adjustment {
    let before = config.clone();

    match control {
        Control::SensitivityUp => {
            config.sensitivity = step(config.sensitivity, SENSITIVITY_STEP, SENSITIVITY_RANGE)
        }
        Control::SensitivityDown => {
            config.sensitivity = step(config.sensitivity, -SENSITIVITY_STEP, SENSITIVITY_RANGE)
        }
        Control::WaveSmoothingUp => {
            config.waveform_smoothing = step(
                config.waveform_smoothing,
                WAVE_SMOOTHING_STEP,
                WAVE_SMOOTHING_RANGE,
            )
        }
        Control::WaveSmoothingDown => {
            config.waveform_smoothing = step(
                config.waveform_smoothing,
                -WAVE_SMOOTHING_STEP,
                WAVE_SMOOTHING_RANGE,
            )
        }
        Control::TimeDecayUp => {
            config.smoothing_time_constant = step(
                config.smoothing_time_constant,
                TIME_DECAY_STEP,
                TIME_DECAY_RANGE,
            )
        }
        Control::TimeDecayDown => {
            config.smoothing_time_constant = step(
                config.smoothing_time_constant,
                -TIME_DECAY_STEP,
                TIME_DECAY_RANGE,
            )
        }
        Control::SpacingUp => {
            config.ring_spacing = step(config.ring_spacing, SPACING_STEP, SPACING_RANGE)
        }
        Control::SpacingDown => {
            config.ring_spacing = step(config.ring_spacing, -SPACING_STEP, SPACING_RANGE)
        }
        Control::RadiusUp => {
            config.base_radius = step(config.base_radius, RADIUS_STEP, RADIUS_RANGE)
        }
        Control::RadiusDown => {
            config.base_radius = step(config.base_radius, -RADIUS_STEP, RADIUS_RANGE)
        }
        Control::AmplitudeUp => {
            config.wave_amplitude = step(config.wave_amplitude, AMPLITUDE_STEP, AMPLITUDE_RANGE)
        }
        Control::AmplitudeDown => {
            config.wave_amplitude = step(config.wave_amplitude, -AMPLITUDE_STEP, AMPLITUDE_RANGE)
        }
        Control::MoreRings => {
            if config.ring_count < RING_COUNT_RANGE.1 {
                config.ring_count += 1;
            }
        }
        Control::FewerRings => {
            if config.ring_count > RING_COUNT_RANGE.0 {
                config.ring_count -= 1;
            }
        }
        Control::NextColor => config.base_color = next_preset(config.base_color),
    }

    if config.ring_count != before.ring_count {
        Adjustment::Resized
    } else if *config != before {
        Adjustment::Updated
    } else {
        Adjustment::Unchanged
    }
}

/// Preset after `current`; the first preset when `current` is not one
pub fn next_preset(current: Rgb) -> Rgb {
    let next = COLOR_PRESETS
        .iter()
        .position(|&hex| Rgb::from_hex_u32(hex) == current)
        .map_or(0, |i| (i + 1) % COLOR_PRESETS.len());
    Rgb::from_hex_u32(COLOR_PRESETS[next])
}

/// Swap between the light and dark background; any other color goes dark
pub fn toggle_theme(render: &mut RenderConfig) -> Rgb {
    let light = Rgb::from_hex_u32(LIGHT_BACKGROUND);
    render.background = if render.background == light {
        Rgb::from_hex_u32(DARK_BACKGROUND)
    } else {
        light
    };
    render.background
}

fn step(value: f32, delta: f32, (min, max): (f32, f32)) -> f32 {
    // Snap to 1/1000 so repeated steps land on round values
    let next = ((value + delta) * 1000.0).round() / 1000.0;
    if delta > 0.0 {
        if value >= max {
            value
        } else {
            next.min(max)
        }
    } else if value <= min {
        value
    } else {
        next.max(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_steps_and_clamps() {
        let mut config = VisualizerConfig::default();
        assert_eq!(apply(&mut config, Control::SensitivityUp), Adjustment::Updated);
        assert!((config.sensitivity - 3.9).abs() < 1e-6);

        for _ in 0..50 {
            apply(&mut config, Control::SensitivityUp);
        }
        assert_eq!(config.sensitivity, 5.0);
        assert_eq!(apply(&mut config, Control::SensitivityUp), Adjustment::Unchanged);
    }

    #[test]
    fn test_ring_count_reports_resize() {
        let mut config = VisualizerConfig::default();
        assert_eq!(apply(&mut config, Control::MoreRings), Adjustment::Resized);
        assert_eq!(config.ring_count, 13);

        config.ring_count = 5;
        assert_eq!(apply(&mut config, Control::FewerRings), Adjustment::Unchanged);
        assert_eq!(config.ring_count, 5);
    }

    #[test]
    fn test_out_of_range_values_are_not_pulled_back() {
        let mut config = VisualizerConfig {
            ring_count: 3,
            ..Default::default()
        };
        assert_eq!(apply(&mut config, Control::FewerRings), Adjustment::Unchanged);
        assert_eq!(config.ring_count, 3);

        config.waveform_smoothing = 1.0;
        apply(&mut config, Control::WaveSmoothingUp);
        assert_eq!(config.waveform_smoothing, 1.0);
        apply(&mut config, Control::WaveSmoothingDown);
        assert_eq!(config.waveform_smoothing, 0.95);
    }

    #[test]
    fn test_time_decay_bounds() {
        let mut config = VisualizerConfig::default();
        for _ in 0..100 {
            apply(&mut config, Control::TimeDecayUp);
        }
        assert_eq!(config.smoothing_time_constant, 0.99);
        for _ in 0..200 {
            apply(&mut config, Control::TimeDecayDown);
        }
        assert_eq!(config.smoothing_time_constant, 0.1);
    }

    #[test]
    fn test_colors_cycle() {
        let mut config = VisualizerConfig::default();
        apply(&mut config, Control::NextColor);
        assert_eq!(config.base_color, Rgb::from_hex_u32(0xff00ff));

        for _ in 0..5 {
            apply(&mut config, Control::NextColor);
        }
        assert_eq!(config.base_color, Rgb::from_hex_u32(0x00ffff));

        config.base_color = Rgb::from_hex_u32(0x123456);
        apply(&mut config, Control::NextColor);
        assert_eq!(config.base_color, Rgb::from_hex_u32(0x00ffff));
    }

    #[test]
    fn test_radius_and_amplitude_bounds() {
        let mut config = VisualizerConfig::default();
        assert_eq!(apply(&mut config, Control::RadiusUp), Adjustment::Updated);
        assert!((config.base_radius - 0.49).abs() < 1e-6);
        assert_eq!(apply(&mut config, Control::AmplitudeDown), Adjustment::Updated);
        assert!((config.wave_amplitude - 0.09).abs() < 1e-6);

        for _ in 0..200 {
            apply(&mut config, Control::RadiusUp);
            apply(&mut config, Control::AmplitudeUp);
        }
        assert_eq!(config.base_radius, 1.0);
        assert_eq!(config.wave_amplitude, 0.5);

        for _ in 0..200 {
            apply(&mut config, Control::RadiusDown);
            apply(&mut config, Control::AmplitudeDown);
        }
        assert_eq!(config.base_radius, 0.05);
        assert_eq!(config.wave_amplitude, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spacing_steps_by_thousandths() {
        let mut config = VisualizerConfig::default();
        apply(&mut config, Control::SpacingUp);
        assert!((config.ring_spacing - 0.051).abs() < 1e-6);
        apply(&mut config, Control::SpacingDown);
        apply(&mut config, Control::SpacingDown);
        assert!((config.ring_spacing - 0.049).abs() < 1e-6);
    }

    #[test]
    fn test_theme_toggles() {
        let mut render = RenderConfig::default();
        assert_eq!(render.background, Rgb::from_hex_u32(LIGHT_BACKGROUND));

        assert_eq!(toggle_theme(&mut render), Rgb::from_hex_u32(DARK_BACKGROUND));
        assert_eq!(render.background, Rgb::from_hex_u32(DARK_BACKGROUND));
        assert_eq!(toggle_theme(&mut render), Rgb::from_hex_u32(LIGHT_BACKGROUND));

        // A custom background switches to dark first
        render.background = Rgb::from_hex_u32(0x202040);
        assert_eq!(toggle_theme(&mut render), Rgb::from_hex_u32(DARK_BACKGROUND));
    }

    #[test]
    fn test_steps_keep_config_valid() {
        let mut config = VisualizerConfig::default();
        for control in [
            Control::SpacingDown,
            Control::WaveSmoothingDown,
            Control::SensitivityDown,
        ] {
            for _ in 0..200 {
                apply(&mut config, control);
            }
        }
        assert!(config.validate().is_ok());
        assert_eq!(config.ring_spacing, 0.001);
        assert_eq!(config.waveform_smoothing, 0.0);
        assert_eq!(config.sensitivity, 0.1);
    }
}
