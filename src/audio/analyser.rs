//! Byte spectrum analysis with temporal smoothing.
//!
//! Turns the latest `fft_size` samples into `fft_size / 2` magnitudes on a
//! 0..=255 scale: Blackman window, forward FFT, per-bin exponential smoothing
//! across calls, then a linear map from a decibel range onto bytes.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// FFT analyser producing smoothed byte magnitudes
pub struct SpectrumAnalyser {
    planner: FftPlanner<f32>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes carried between calls
    smoothed: Vec<f32>,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl SpectrumAnalyser {
    /// Create an analyser; `fft_size` must be a power of two (validated by the caller).
    pub fn new(fft_size: usize, smoothing: f32, min_decibels: f32, max_decibels: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            planner,
            fft,
            window: blackman_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; fft_size / 2],
            smoothing: smoothing.clamp(0.0, 1.0),
            min_decibels,
            max_decibels,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Change the temporal smoothing constant without resetting state
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 1.0);
    }

    /// Forget smoothing history so the next frame starts from silence
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }

    /// Re-plan for a new window size; smoothing state restarts from silence
    pub fn resize(&mut self, fft_size: usize) {
        if fft_size == self.fft_size() {
            return;
        }
        self.fft = self.planner.plan_fft_forward(fft_size);
        self.window = blackman_window(fft_size);
        self.buffer = vec![Complex::new(0.0, 0.0); fft_size];
        self.scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        self.smoothed = vec![0.0; fft_size / 2];
    }

    /// Analyse `samples` (oldest first) into byte magnitudes.
    ///
    /// # Panics
    /// If `samples` is not `fft_size` long or `out` is not `bin_count` long.
    pub fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        assert_eq!(samples.len(), self.fft_size(), "sample window size");
        assert_eq!(out.len(), self.bin_count(), "output bin count");

        for ((slot, &sample), &weight) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * weight, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let magnitude_scale = 1.0 / self.fft_size() as f32;
        let db_scale = 255.0 / (self.max_decibels - self.min_decibels);

        for ((smoothed, bin), byte) in self
            .smoothed
            .iter_mut()
            .zip(&self.buffer)
            .zip(out.iter_mut())
        {
            let magnitude = bin.norm() * magnitude_scale;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }

            // log10(0) = -inf clamps to 0
            let db = 20.0 * smoothed.log10();
            *byte = (db_scale * (db - self.min_decibels)).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blackman window (alpha = 0.16) over `size` samples
pub fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    (0..size)
        .map(|i| {
            let x = i as f32 / size as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}
