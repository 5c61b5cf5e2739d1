//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::params::Settings;
use crate::rings::Rgb;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sonic-rings", version)]
#[command(about = "Live microphone spectrum drawn as time-decayed concentric rings", long_about = None)]
pub struct Args {
    /// TOML settings file (flags override its values)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input device name (case-insensitive substring match)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Base ring color
    #[arg(long, value_name = "#RRGGBB")]
    pub color: Option<Rgb>,

    /// Displacement gain for the innermost ring
    #[arg(long, value_name = "GAIN")]
    pub sensitivity: Option<f32>,

    /// Number of rings (history depth)
    #[arg(long, value_name = "COUNT")]
    pub rings: Option<usize>,

    /// Radius added per ring (scene units)
    #[arg(long, value_name = "UNITS")]
    pub spacing: Option<f32>,

    /// Radius of the innermost ring (scene units)
    #[arg(long, value_name = "UNITS")]
    pub radius: Option<f32>,

    /// Displacement at full-scale magnitude (scene units)
    #[arg(long, value_name = "UNITS")]
    pub amplitude: Option<f32>,

    /// Temporal smoothing of the spectrum (0..1)
    #[arg(long, value_name = "FACTOR")]
    pub time_decay: Option<f32>,

    /// Smoothing across neighbouring bins (0..1)
    #[arg(long, value_name = "FACTOR")]
    pub wave_smoothing: Option<f32>,

    /// FFT window size in samples (power of 2)
    #[arg(long, value_name = "SAMPLES")]
    pub fft_size: Option<usize>,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,
}

impl Args {
    /// Defaults, then the settings file, then flags; validated.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Settings::load(path)?
            }
            None => Settings::default(),
        };
        self.apply_overrides(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    /// Overwrite settings with every flag that was given
    pub fn apply_overrides(&self, settings: &mut Settings) {
        let visualizer = &mut settings.visualizer;
        if let Some(color) = self.color {
            visualizer.base_color = color;
        }
        if let Some(sensitivity) = self.sensitivity {
            visualizer.sensitivity = sensitivity;
        }
        if let Some(rings) = self.rings {
            visualizer.ring_count = rings;
        }
        if let Some(spacing) = self.spacing {
            visualizer.ring_spacing = spacing;
        }
        if let Some(radius) = self.radius {
            visualizer.base_radius = radius;
        }
        if let Some(amplitude) = self.amplitude {
            visualizer.wave_amplitude = amplitude;
        }
        if let Some(time_decay) = self.time_decay {
            visualizer.smoothing_time_constant = time_decay;
        }
        if let Some(wave_smoothing) = self.wave_smoothing {
            visualizer.waveform_smoothing = wave_smoothing;
        }

        if let Some(fft_size) = self.fft_size {
            settings.analysis.fft_size = fft_size;
        }
        if let Some(width) = self.width {
            settings.render.window_width = width;
        }
        if let Some(height) = self.height {
            settings.render.window_height = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sonic-rings").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        let settings = parse(&[]).load_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = parse(&["--rings", "20", "--color", "#ff00ff", "--time-decay", "0.5"])
            .load_settings()
            .unwrap();
        assert_eq!(settings.visualizer.ring_count, 20);
        assert_eq!(settings.visualizer.base_color, Rgb::from_hex_u32(0xff00ff));
        assert_eq!(settings.visualizer.smoothing_time_constant, 0.5);
        assert_eq!(settings.visualizer.sensitivity, 3.8);
    }

    #[test]
    fn test_bad_color_rejected_by_parser() {
        let result = Args::try_parse_from(["sonic-rings", "--color", "teal"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        assert!(matches!(
            parse(&["--rings", "0"]).load_settings(),
            Err(ConfigError::RingCount(0))
        ));
        assert!(matches!(
            parse(&["--fft-size", "300"]).load_settings(),
            Err(ConfigError::FftSize(300))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = parse(&["--config", "/nonexistent/sonic-rings.toml"]).load_settings();
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_device_flags() {
        let args = parse(&["--device", "USB", "--list-devices"]);
        assert_eq!(args.device.as_deref(), Some("USB"));
        assert!(args.list_devices);
    }
}
