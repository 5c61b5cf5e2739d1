//! Ring geometry generator with double-buffered output.
//!
//! Each tick fills the back buffer from the history and swaps it to the
//! front, so the published frame is never observed half-written. Both
//! buffers are sized once per ring count; a steady-state tick allocates
//! nothing.

use std::f32::consts::TAU;

use super::{
    Rgb, RenderSink, RingVisual, BASS_RANGE, IDLE_AMPLITUDE, IDLE_PERIOD_MS, LIGHTNESS_STEP,
    NOISE_GATE, NUM_POINTS, OPACITY_EXPONENT, PHASE_STEP, SPECTRUM_FRACTION, Z_STEP,
};
use crate::analysis::HistoryBuffer;
use crate::params::VisualizerConfig;

/// Linear falloff from 1 at the innermost ring to exactly 0 at the outermost
pub fn ring_decay(ring_index: usize, ring_count: usize) -> f32 {
    let span = ring_count.saturating_sub(1).max(1);
    1.0 - ring_index as f32 / span as f32
}

/// Opacity from ring decay and the lowest bin's magnitude
pub fn ring_opacity(decay: f32, bass_magnitude: u8) -> f32 {
    let bass_energy = bass_magnitude.saturating_sub(NOISE_GATE) as f32 / BASS_RANGE;
    (0.5 + bass_energy * 0.5) * decay.powf(OPACITY_EXPONENT)
}

/// All rings for one tick, plus which of them were regenerated
#[derive(Debug, Clone, Default)]
pub struct RingFrame {
    rings: Vec<RingVisual>,
    fresh: Vec<bool>,
}

impl RingFrame {
    fn resize(&mut self, ring_count: usize) {
        self.rings.resize_with(ring_count, RingVisual::empty);
        self.fresh.resize(ring_count, false);
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn rings(&self) -> &[RingVisual] {
        &self.rings
    }

    pub fn ring(&self, ring_index: usize) -> Option<&RingVisual> {
        self.rings.get(ring_index)
    }

    /// False when the ring's history frame was unavailable this tick
    pub fn is_fresh(&self, ring_index: usize) -> bool {
        self.fresh.get(ring_index).copied().unwrap_or(false)
    }

    /// Hand every regenerated ring to `sink`; skipped rings are left alone.
    pub fn submit_to<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        for (k, ring) in self.rings.iter().enumerate() {
            if self.fresh[k] {
                sink.submit(k, ring);
            }
        }
    }
}

/// Per-ring colors, recomputed only when the base color or ring count changes
#[derive(Debug, Default)]
struct ColorCache {
    base: Option<Rgb>,
    colors: Vec<Rgb>,
}

impl ColorCache {
    fn update(&mut self, base: Rgb, ring_count: usize) {
        if self.base == Some(base) && self.colors.len() == ring_count {
            return;
        }
        self.colors.clear();
        self.colors
            .extend((0..ring_count).map(|k| base.offset_lightness(LIGHTNESS_STEP * k as f32)));
        self.base = Some(base);
    }
}

/// Maps the frame history into per-ring geometry
#[derive(Debug, Default)]
pub struct RingGenerator {
    front: RingFrame,
    back: RingFrame,
    colors: ColorCache,
}

impl RingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one ring per configured index and publish the result.
    ///
    /// Rings whose history frame is missing keep their previous geometry and
    /// are marked stale. The output is a pure function of the history, the
    /// config and `elapsed_ms`.
    pub fn generate(
        &mut self,
        history: &HistoryBuffer,
        config: &VisualizerConfig,
        elapsed_ms: f64,
    ) -> &RingFrame {
        let ring_count = config.ring_count;
        self.back.resize(ring_count);
        self.colors.update(config.base_color, ring_count);

        for k in 0..ring_count {
            match history.get(k) {
                Some(frame) if !frame.is_empty() => {
                    let ring = &mut self.back.rings[k];
                    build_ring(ring, k, ring_count, frame, config, elapsed_ms);
                    ring.color = self.colors.colors[k];
                    self.back.fresh[k] = true;
                }
                _ => {
                    if let Some(previous) = self.front.rings.get(k) {
                        self.back.rings[k].copy_from(previous);
                    }
                    self.back.fresh[k] = false;
                }
            }
        }

        std::mem::swap(&mut self.front, &mut self.back);
        &self.front
    }
}

fn build_ring(
    ring: &mut RingVisual,
    k: usize,
    ring_count: usize,
    frame: &[u8],
    config: &VisualizerConfig,
    elapsed_ms: f64,
) {
    let decay = ring_decay(k, ring_count);
    let sensitivity = config.sensitivity * decay;
    let radius = config.base_radius + k as f32 * config.ring_spacing;
    let z = k as f32 * Z_STEP;

    let slice = (frame.len() as f32 * SPECTRUM_FRACTION).floor();
    let last_bin = frame.len() - 1;
    let breathing_amplitude = IDLE_AMPLITUDE * config.base_radius;
    // f64 keeps the phase exact over long sessions
    let time_phase = elapsed_ms / IDLE_PERIOD_MS;

    ring.vertices[0] = [0.0, 0.0, z];
    for i in 0..NUM_POINTS {
        let normalized = i as f32 / NUM_POINTS as f32;
        let mirror = 1.0 - (normalized * 2.0 - 1.0).abs();
        let data_index = ((mirror * slice).floor() as usize).min(last_bin);

        let gated = frame[data_index].saturating_sub(NOISE_GATE);
        let breathing = (time_phase + i as f64 * PHASE_STEP).sin() as f32 * breathing_amplitude;
        let displacement = (gated as f32 / 255.0) * config.wave_amplitude * sensitivity;
        let r = radius + displacement + breathing;

        let theta = i as f32 * (TAU / NUM_POINTS as f32);
        ring.vertices[i + 1] = [theta.cos() * r, theta.sin() * r, z];
    }

    ring.opacity = ring_opacity(decay, frame[0]);
}
