//! Audio analysis configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Spectrum analysis configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// FFT window size in samples (power of 2)
    /// Bin count is half of this.
    pub fft_size: usize,

    /// Level mapped to magnitude 0 (dBFS)
    pub min_decibels: f32,

    /// Level mapped to magnitude 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

/// Center frequency (Hz) of an FFT bin at the given window size and sample rate
pub fn bin_frequency_hz(bin: usize, fft_size: usize, sample_rate_hz: u32) -> f32 {
    (bin as f32 * sample_rate_hz as f32) / fft_size as f32
}

impl AnalysisConfig {
    /// Number of frequency bins per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        if !(self.max_decibels > self.min_decibels) {
            return Err(ConfigError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}
