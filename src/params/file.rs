//! Optional TOML settings file layered under the command line.

use std::path::Path;

use serde::Deserialize;

use super::{AnalysisConfig, RenderConfig, VisualizerConfig};
use crate::error::ConfigError;

/// Complete application settings.
///
/// Every section and key is optional; missing values keep their defaults.
///
/// ```toml
/// [visualizer]
/// base_color = "#ff00ff"
/// ring_count = 20
///
/// [analysis]
/// fft_size = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub visualizer: VisualizerConfig,
    pub analysis: AnalysisConfig,
    pub render: RenderConfig,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.visualizer.validate()?;
        self.analysis.validate()?;
        self.render.validate()?;
        Ok(())
    }
}
