//! Live spectrum acquisition.
//!
//! `SpectralFrameSource` is the seam between the analysis session and the
//! input: the microphone implementation lives in `capture`, tests script
//! their own frames.

pub mod analyser;
pub mod capture;

pub use analyser::SpectrumAnalyser;
pub use capture::{list_input_devices, InputDeviceInfo, MicrophoneSource, SampleWindow};

use crate::error::{AcquisitionError, ConfigError};

/// Supplier of byte spectrum frames, one per tick.
pub trait SpectralFrameSource {
    /// Set the window size (as `bin_count`, half the FFT size) and the
    /// temporal smoothing constant. Called before `start` and again whenever
    /// the smoothing constant changes; must be cheap when the bin count is
    /// unchanged.
    fn configure(&mut self, bin_count: usize, temporal_smoothing: f32)
        -> Result<(), ConfigError>;

    /// Bins per delivered frame
    fn bin_count(&self) -> usize;

    /// Acquire the input. Starting twice is a no-op.
    fn start(&mut self) -> Result<(), AcquisitionError>;

    /// Release the input. Later frames are silence.
    fn stop(&mut self);

    /// Fill `out` (exactly `bin_count` long) with the latest magnitudes.
    fn next_frame(&mut self, out: &mut [u8]);

    /// Sample rate of the live input, once known
    fn sample_rate_hz(&self) -> Option<u32> {
        None
    }
}
