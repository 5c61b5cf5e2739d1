//! Sonic Rings library - live audio spectrum as time-decayed concentric rings

pub mod analysis;
pub mod audio;
pub mod camera;
pub mod cli;
pub mod controls;
pub mod error;
pub mod params;
pub mod rendering;
pub mod rings;
