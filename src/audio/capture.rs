//! Microphone capture via cpal.
//!
//! The input callback downmixes to mono and writes into a shared
//! `SampleWindow`; each tick snapshots the window under the lock and runs
//! the analyser on the render thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::{Arc, Mutex, PoisonError};

use super::analyser::SpectrumAnalyser;
use super::SpectralFrameSource;
use crate::error::{AcquisitionError, ConfigError};
use crate::params::AnalysisConfig;

/// Circular buffer holding the most recent mono samples
pub struct SampleWindow {
    samples: Box<[f32]>,
    /// Next slot to overwrite (= oldest sample)
    write_pos: usize,
}

impl SampleWindow {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len].into_boxed_slice(),
            write_pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.is_empty() {
            return;
        }
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// Append interleaved frames, averaging each frame's channels to mono
    pub fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: Sample,
        f32: FromSample<T>,
    {
        let channels = channels.max(1);
        for frame in data.chunks(channels) {
            let sum: f32 = frame
                .iter()
                .map(|&s| {
                    let v: f32 = Sample::from_sample(s);
                    v
                })
                .sum();
            self.push(sum / frame.len() as f32);
        }
    }

    /// Copy the window into `out`, oldest sample first
    pub fn copy_latest(&self, out: &mut [f32]) {
        assert_eq!(out.len(), self.samples.len(), "sample window size");
        let (newer, older) = self.samples.split_at(self.write_pos);
        out[..older.len()].copy_from_slice(older);
        out[older.len()..].copy_from_slice(newer);
    }

    /// Reallocate to `len` samples of silence
    pub fn resize(&mut self, len: usize) {
        self.samples = vec![0.0; len].into_boxed_slice();
        self.write_pos = 0;
    }
}

/// Input device as reported by the host
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// Enumerate input devices on the default host
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>, AcquisitionError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| classify_backend_error(e.to_string()))?;

    Ok(devices
        .filter_map(|device| device.name().ok())
        .map(|name| InputDeviceInfo {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
        })
        .collect())
}

/// Live microphone spectrum source
pub struct MicrophoneSource {
    /// Substring of the wanted device name; `None` = host default
    device_name: Option<String>,
    analyser: SpectrumAnalyser,
    window: Arc<Mutex<SampleWindow>>,
    /// Render-thread copy of the window, reused every tick
    snapshot: Vec<f32>,
    stream: Option<cpal::Stream>,
    sample_rate_hz: Option<u32>,
}

impl MicrophoneSource {
    pub fn new(
        device_name: Option<String>,
        analysis: &AnalysisConfig,
        temporal_smoothing: f32,
    ) -> Result<Self, ConfigError> {
        analysis.validate()?;
        let fft_size = analysis.fft_size;

        Ok(Self {
            device_name,
            analyser: SpectrumAnalyser::new(
                fft_size,
                temporal_smoothing,
                analysis.min_decibels,
                analysis.max_decibels,
            ),
            window: Arc::new(Mutex::new(SampleWindow::new(fft_size))),
            snapshot: vec![0.0; fft_size],
            stream: None,
            sample_rate_hz: None,
        })
    }

}

impl SpectralFrameSource for MicrophoneSource {
    fn configure(
        &mut self,
        bin_count: usize,
        temporal_smoothing: f32,
    ) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&temporal_smoothing) {
            return Err(ConfigError::Smoothing {
                name: "smoothing_time_constant",
                value: temporal_smoothing,
            });
        }
        let fft_size = bin_count * 2;
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(ConfigError::FftSize(fft_size));
        }

        if fft_size != self.analyser.fft_size() {
            self.analyser.resize(fft_size);
            self.snapshot = vec![0.0; fft_size];
            self.window
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .resize(fft_size);
        }
        self.analyser.set_smoothing(temporal_smoothing);
        Ok(())
    }

    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = select_input_device(&host, self.device_name.as_deref())?;
        let device_label = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        if config.channels == 0 {
            return Err(AcquisitionError::DeviceUnavailable(format!(
                "{} reported 0 channels",
                device_label
            )));
        }

        let window = Arc::clone(&self.window);
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, window)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, window)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, window)?,
            other => {
                return Err(AcquisitionError::Stream(format!(
                    "Unsupported sample format {:?}",
                    other
                )))
            }
        };
        stream.play()?;

        log::info!(
            "Audio input: {} @ {}Hz, {} channel(s), {:?}",
            device_label,
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        self.sample_rate_hz = Some(config.sample_rate.0);
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Audio input released");
        }
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        let len = window.len();
        window.resize(len);
        self.analyser.reset();
    }

    fn next_frame(&mut self, out: &mut [u8]) {
        {
            let window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
            window.copy_latest(&mut self.snapshot);
        }
        self.analyser.process(&self.snapshot, out);
    }

    fn sample_rate_hz(&self) -> Option<u32> {
        self.sample_rate_hz
    }
}

fn select_input_device(
    host: &cpal::Host,
    wanted: Option<&str>,
) -> Result<cpal::Device, AcquisitionError> {
    let Some(wanted) = wanted else {
        return host.default_input_device().ok_or_else(|| {
            AcquisitionError::DeviceUnavailable("No audio input device found".to_string())
        });
    };

    let wanted_lower = wanted.to_lowercase();
    host.input_devices()
        .map_err(|e| classify_backend_error(e.to_string()))?
        .find(|device| {
            device
                .name()
                .map(|name| name.to_lowercase().contains(&wanted_lower))
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            AcquisitionError::DeviceUnavailable(format!("No input device matching '{}'", wanted))
        })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    window: Arc<Mutex<SampleWindow>>,
) -> Result<cpal::Stream, AcquisitionError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if let Ok(mut window) = window.lock() {
                window.push_interleaved(data, channels);
            }
        },
        |err| log::warn!("Audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Backends only report permission problems as free text
fn classify_backend_error(description: String) -> AcquisitionError {
    let lower = description.to_lowercase();
    let denied = ["permission", "denied", "not authorized", "not permitted"]
        .iter()
        .any(|needle| lower.contains(needle));
    if denied {
        AcquisitionError::PermissionDenied(description)
    } else {
        AcquisitionError::DeviceUnavailable(description)
    }
}

impl From<cpal::DefaultStreamConfigError> for AcquisitionError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                classify_backend_error(err.description)
            }
            other => AcquisitionError::DeviceUnavailable(other.to_string()),
        }
    }
}

impl From<cpal::BuildStreamError> for AcquisitionError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::BackendSpecific { err } => {
                classify_backend_error(err.description)
            }
            cpal::BuildStreamError::DeviceNotAvailable => {
                AcquisitionError::DeviceUnavailable(err.to_string())
            }
            other => AcquisitionError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for AcquisitionError {
    fn from(err: cpal::PlayStreamError) -> Self {
        match err {
            cpal::PlayStreamError::BackendSpecific { err } => {
                classify_backend_error(err.description)
            }
            other => AcquisitionError::DeviceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_starts_silent() {
        let window = SampleWindow::new(4);
        let mut out = [1.0f32; 4];
        window.copy_latest(&mut out);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_window_keeps_latest_in_order() {
        let mut window = SampleWindow::new(4);
        for s in 1..=6 {
            window.push(s as f32);
        }

        let mut out = [0.0f32; 4];
        window.copy_latest(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_stereo_downmix() {
        let mut window = SampleWindow::new(2);
        window.push_interleaved(&[1.0f32, 0.0, 0.5, 0.5], 2);

        let mut out = [0.0f32; 2];
        window.copy_latest(&mut out);
        assert_eq!(out, [0.5, 0.5]);
    }

    #[test]
    fn test_integer_samples_convert() {
        let mut window = SampleWindow::new(2);
        window.push_interleaved(&[0i16, i16::MIN], 1);

        let mut out = [1.0f32; 2];
        window.copy_latest(&mut out);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], -1.0);
    }

    #[test]
    fn test_resize_clears() {
        let mut window = SampleWindow::new(2);
        window.push(1.0);
        window.resize(3);

        let mut out = [1.0f32; 3];
        window.copy_latest(&mut out);
        assert_eq!(out, [0.0; 3]);
    }

    #[test]
    fn test_permission_messages_classified() {
        assert!(matches!(
            classify_backend_error("Access denied by system".to_string()),
            AcquisitionError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_backend_error("device went away".to_string()),
            AcquisitionError::DeviceUnavailable(_)
        ));
    }

    #[test]
    fn test_configure_validates_without_device() {
        let mut source = MicrophoneSource::new(None, &AnalysisConfig::default(), 0.8).unwrap();
        assert_eq!(source.bin_count(), 256);
        assert!(source.stream.is_none());

        assert!(source.configure(256, 1.5).is_err());
        assert!(matches!(
            source.configure(100, 0.5),
            Err(ConfigError::FftSize(200))
        ));

        source.configure(512, 0.5).unwrap();
        assert_eq!(source.bin_count(), 512);

        // Not started: frames are computed from silence
        let mut out = vec![7u8; 512];
        source.next_frame(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_stop_silences_frames() {
        let mut source = MicrophoneSource::new(None, &AnalysisConfig::default(), 0.8).unwrap();
        let fft_size = source.analyser.fft_size();
        {
            let mut window = source.window.lock().unwrap();
            for i in 0..fft_size {
                let phase = std::f32::consts::TAU * 8.0 * i as f32 / fft_size as f32;
                window.push(0.5 * phase.sin());
            }
        }

        let mut out = vec![0u8; source.bin_count()];
        source.next_frame(&mut out);
        assert!(out.iter().any(|&b| b > 0));

        source.stop();
        source.next_frame(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }
}
