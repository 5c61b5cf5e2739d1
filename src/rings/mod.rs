//! Ring geometry derived from the spectrum history.
//!
//! Ring k draws history frame k (0 = newest, innermost). Each ring is a
//! triangle fan: one center vertex plus `NUM_POINTS` perimeter vertices whose
//! radius follows the frame's low-frequency bins, mirrored around the circle.

pub mod color;
pub mod geometry;
pub mod mesh;

pub use color::Rgb;
pub use geometry::{ring_decay, ring_opacity, RingFrame, RingGenerator};
pub use mesh::{fan_indices, perimeter_uvs, Vertex};

/// Perimeter vertices per ring
pub const NUM_POINTS: usize = 128;

/// Vertices per ring including the fan center
pub const VERTICES_PER_RING: usize = NUM_POINTS + 1;

/// Magnitudes at or below this are treated as silence
pub const NOISE_GATE: u8 = 30;

/// Gated bass magnitude that maps to full opacity boost
pub const BASS_RANGE: f32 = 225.0;

/// Period of the idle breathing motion (milliseconds per radian)
pub const IDLE_PERIOD_MS: f64 = 1500.0;

/// Idle breathing amplitude as a fraction of the base radius
pub const IDLE_AMPLITUDE: f32 = 0.005;

/// Phase offset between neighbouring perimeter points (radians)
pub const PHASE_STEP: f64 = 0.1;

/// Depth offset per ring index (scene units, recedes from the camera)
pub const Z_STEP: f32 = -0.05;

/// Exponent shaping the outward opacity falloff
pub const OPACITY_EXPONENT: f32 = 1.2;

/// Fraction of the bins (lowest first) mapped onto each half circle
pub const SPECTRUM_FRACTION: f32 = 0.25;

/// Lightness shift per ring index (outer rings darker)
pub const LIGHTNESS_STEP: f32 = -0.01;

/// Geometry and appearance of one ring for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct RingVisual {
    /// Fan center followed by `NUM_POINTS` perimeter points
    pub vertices: Vec<[f32; 3]>,
    pub opacity: f32,
    pub color: Rgb,
}

impl RingVisual {
    /// Collapsed, fully transparent ring
    pub fn empty() -> Self {
        Self {
            vertices: vec![[0.0; 3]; VERTICES_PER_RING],
            opacity: 0.0,
            color: Rgb::new(0.0, 0.0, 0.0),
        }
    }

    pub fn center(&self) -> [f32; 3] {
        self.vertices[0]
    }

    /// Distance of perimeter point `i` from the ring axis
    pub fn radius_at(&self, i: usize) -> f32 {
        let [x, y, _] = self.vertices[i + 1];
        x.hypot(y)
    }

    /// Overwrite with `other` without reallocating
    pub fn copy_from(&mut self, other: &RingVisual) {
        self.vertices.copy_from_slice(&other.vertices);
        self.opacity = other.opacity;
        self.color = other.color;
    }
}

/// Consumer of per-tick ring updates.
///
/// A ring index that is not submitted in a tick keeps whatever the sink
/// last received for it.
pub trait RenderSink {
    fn submit(&mut self, ring_index: usize, ring: &RingVisual);
}
