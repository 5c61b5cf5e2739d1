//! Error types for session start-up and configuration.
//!
//! Nothing in a tick can fail: every error here is raised before the first
//! tick runs, either while validating configuration or while acquiring the
//! input device.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to acquire or start the live input.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Input stream failed: {0}")]
    Stream(String),
}

/// Configuration rejected before any tick runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Ring count must be at least 1, got {0}")]
    RingCount(usize),
    #[error("Base radius must be > 0, got {0}")]
    BaseRadius(f32),
    #[error("Sensitivity must be > 0, got {0}")]
    Sensitivity(f32),
    #[error("Ring spacing must be >= 0, got {0}")]
    RingSpacing(f32),
    #[error("Wave amplitude must be >= 0, got {0}")]
    WaveAmplitude(f32),
    #[error("{name} must be within [0, 1], got {value}")]
    Smoothing { name: &'static str, value: f32 },
    #[error("FFT size must be a power of 2 and at least 2, got {0}")]
    FftSize(usize),
    #[error("Decibel range is empty: min {min} dB, max {max} dB")]
    DecibelRange { min: f32, max: f32 },
    #[error("Invalid render setting {name}: {value}")]
    Render { name: &'static str, value: f32 },
    #[error("Bin count mismatch: history expects {expected}, source delivers {actual}")]
    BinCountMismatch { expected: usize, actual: usize },
    #[error("Invalid color '{0}' (expected #rrggbb)")]
    Color(String),
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Anything that can stop an analysis session from starting.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
