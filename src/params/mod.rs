//! Parameter definitions with units and documented semantics.
//!
//! All tunables live here with:
//! - Units (scene units, samples, dBFS, degrees)
//! - Documented ranges and meanings
//! - Validation before the first tick

mod audio;
mod file;
mod render;
mod visualizer;

// Re-export all types
pub use audio::{bin_frequency_hz, AnalysisConfig};
pub use file::Settings;
pub use render::RenderConfig;
pub use visualizer::VisualizerConfig;
