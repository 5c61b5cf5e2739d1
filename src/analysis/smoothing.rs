//! Spatial smoothing across neighbouring frequency bins.

/// Blend each bin toward the mean of itself and its two neighbours.
///
/// `strength` is clamped to [0, 1]: 0 copies `raw` unchanged, 1 replaces every
/// bin with its 3-point average. Edge bins reuse themselves as the missing
/// neighbour. Results are truncated back to 8-bit magnitudes.
///
/// # Panics
/// If `raw` and `out` differ in length.
pub fn smooth_bins(raw: &[u8], strength: f32, out: &mut [u8]) {
    assert_eq!(raw.len(), out.len(), "smoothing buffers differ in length");

    let strength = strength.clamp(0.0, 1.0);
    if strength == 0.0 {
        out.copy_from_slice(raw);
        return;
    }

    let strength = strength as f64;
    let last = raw.len().saturating_sub(1);
    for (i, slot) in out.iter_mut().enumerate() {
        let prev = raw[i.saturating_sub(1)] as f64;
        let curr = raw[i] as f64;
        let next = raw[(i + 1).min(last)] as f64;

        let average = (prev + curr + next) / 3.0;
        *slot = (curr * (1.0 - strength) + average * strength) as u8;
    }
}
