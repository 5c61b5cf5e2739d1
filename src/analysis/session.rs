//! Analysis session owning the frame source and the frame history.

use crate::audio::SpectralFrameSource;
use crate::error::{ConfigError, SessionError};
use crate::params::{bin_frequency_hz, AnalysisConfig, VisualizerConfig};

use super::{smooth_bins, FrameStats, HistoryBuffer};

/// One live analysis run: source, scratch frames, history and latest stats.
///
/// Scratch buffers are allocated once at start; a tick never allocates.
pub struct AnalysisSession<S: SpectralFrameSource> {
    source: S,
    raw: Vec<u8>,
    smoothed: Vec<u8>,
    history: HistoryBuffer,
    stats: FrameStats,
    /// Smoothing constant last handed to the source
    temporal_smoothing: f32,
    ticks: u64,
}

impl<S: SpectralFrameSource> AnalysisSession<S> {
    /// Validate configuration, configure and start the source, allocate history.
    ///
    /// Nothing is retained on failure.
    pub fn start(
        mut source: S,
        config: &VisualizerConfig,
        analysis: &AnalysisConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        analysis.validate()?;

        let bin_count = analysis.bin_count();
        source.configure(bin_count, config.smoothing_time_constant)?;
        if source.bin_count() != bin_count {
            return Err(ConfigError::BinCountMismatch {
                expected: bin_count,
                actual: source.bin_count(),
            }
            .into());
        }

        let history = HistoryBuffer::new(config.ring_count, bin_count)?;
        source.start()?;

        log::info!(
            "Analysis started: {} bins, {} rings, temporal smoothing {}",
            bin_count,
            config.ring_count,
            config.smoothing_time_constant
        );

        Ok(Self {
            source,
            raw: vec![0; bin_count],
            smoothed: vec![0; bin_count],
            history,
            stats: FrameStats::default(),
            temporal_smoothing: config.smoothing_time_constant,
            ticks: 0,
        })
    }

    /// Pull one frame, smooth it, record it and return the raw frame's stats.
    ///
    /// `config` must have passed validation (the same snapshot the generator
    /// reads this tick).
    pub fn tick(&mut self, config: &VisualizerConfig) -> FrameStats {
        if config.smoothing_time_constant != self.temporal_smoothing {
            self.forward_smoothing(config.smoothing_time_constant);
        }

        self.source.next_frame(&mut self.raw);
        smooth_bins(&self.raw, config.waveform_smoothing, &mut self.smoothed);

        self.stats = FrameStats::from_frame(&self.raw);
        self.history.push(&self.smoothed);
        self.ticks += 1;
        self.stats
    }

    /// Apply a new configuration between ticks.
    ///
    /// A changed ring count reallocates the history (all frames reset to
    /// silence); other fields take effect on the next tick.
    pub fn reconfigure(&mut self, config: &VisualizerConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if config.ring_count != self.history.capacity() {
            self.history = HistoryBuffer::new(config.ring_count, self.history.bin_count())?;
            log::info!("History resized to {} rings", config.ring_count);
        }
        if config.smoothing_time_constant != self.temporal_smoothing {
            self.forward_smoothing(config.smoothing_time_constant);
        }
        Ok(())
    }

    fn forward_smoothing(&mut self, temporal_smoothing: f32) {
        match self
            .source
            .configure(self.history.bin_count(), temporal_smoothing)
        {
            Ok(()) => self.temporal_smoothing = temporal_smoothing,
            Err(e) => log::warn!("Keeping temporal smoothing {}: {}", self.temporal_smoothing, e),
        }
    }

    /// Release the source and end the session.
    pub fn stop(mut self) {
        self.source.stop();
        log::info!("Analysis stopped after {} ticks", self.ticks);
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn bin_count(&self) -> usize {
        self.history.bin_count()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Frequency (Hz) of the dominant bin, once the source knows its rate
    pub fn dominant_frequency_hz(&self) -> Option<f32> {
        let sample_rate = self.source.sample_rate_hz()?;
        Some(bin_frequency_hz(
            self.stats.dominant_bin,
            self.bin_count() * 2,
            sample_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionError;

    /// Source replaying one fixed frame
    struct ConstantSource {
        frame: Vec<u8>,
        bin_count: usize,
        smoothing: f32,
        configure_calls: usize,
        running: bool,
    }

    impl ConstantSource {
        fn new(frame: Vec<u8>) -> Self {
            Self {
                bin_count: frame.len(),
                frame,
                smoothing: 0.0,
                configure_calls: 0,
                running: false,
            }
        }
    }

    impl SpectralFrameSource for ConstantSource {
        fn configure(&mut self, bin_count: usize, smoothing: f32) -> Result<(), ConfigError> {
            self.bin_count = bin_count;
            self.smoothing = smoothing;
            self.configure_calls += 1;
            Ok(())
        }

        fn bin_count(&self) -> usize {
            self.bin_count
        }

        fn start(&mut self) -> Result<(), AcquisitionError> {
            self.running = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.running = false;
        }

        fn next_frame(&mut self, out: &mut [u8]) {
            out.copy_from_slice(&self.frame);
        }
    }

    fn analysis(bins: usize) -> AnalysisConfig {
        AnalysisConfig {
            fft_size: bins * 2,
            ..Default::default()
        }
    }

    fn config(ring_count: usize) -> VisualizerConfig {
        VisualizerConfig {
            ring_count,
            waveform_smoothing: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_configures_source() {
        let session =
            AnalysisSession::start(ConstantSource::new(vec![0; 4]), &config(3), &analysis(4))
                .unwrap();
        assert!(session.source().running);
        assert_eq!(session.source().smoothing, 0.8);
        assert_eq!(session.history().capacity(), 3);
        assert_eq!(session.bin_count(), 4);
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let result =
            AnalysisSession::start(ConstantSource::new(vec![0; 4]), &config(0), &analysis(4));
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::RingCount(0)))
        ));
    }

    #[test]
    fn test_tick_records_smoothed_and_reports_raw() {
        let frame = vec![200, 0, 0, 0];
        let mut cfg = config(2);
        cfg.waveform_smoothing = 0.8;

        let mut session =
            AnalysisSession::start(ConstantSource::new(frame.clone()), &cfg, &analysis(4))
                .unwrap();
        let stats = session.tick(&cfg);

        // Stats come from the raw frame
        assert_eq!(stats, FrameStats::from_frame(&frame));
        assert_eq!(stats.dominant_bin, 0);

        // History holds the smoothed frame: 200 + (133.3 - 200) * 0.8 = 146.7
        let newest = session.history().get(0).unwrap();
        assert_eq!(newest[0], 146);
        assert_eq!(session.history().get(1).unwrap(), &[0u8; 4][..]);
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_smoothing_change_is_forwarded() {
        let mut cfg = config(2);
        let mut session =
            AnalysisSession::start(ConstantSource::new(vec![1; 4]), &cfg, &analysis(4)).unwrap();
        let calls = session.source().configure_calls;

        session.tick(&cfg);
        assert_eq!(session.source().configure_calls, calls);

        cfg.smoothing_time_constant = 0.3;
        session.tick(&cfg);
        assert_eq!(session.source().smoothing, 0.3);
        assert_eq!(session.source().configure_calls, calls + 1);
    }

    #[test]
    fn test_reconfigure_resizes_history() {
        let mut cfg = config(2);
        let mut session =
            AnalysisSession::start(ConstantSource::new(vec![9; 4]), &cfg, &analysis(4)).unwrap();
        session.tick(&cfg);

        cfg.ring_count = 5;
        session.reconfigure(&cfg).unwrap();
        assert_eq!(session.history().capacity(), 5);
        assert!(session.history().iter().all(|f| f == [0u8; 4]));

        cfg.ring_count = 0;
        assert!(session.reconfigure(&cfg).is_err());
        assert_eq!(session.history().capacity(), 5);
    }

    #[test]
    fn test_no_sample_rate_means_no_frequency() {
        let session =
            AnalysisSession::start(ConstantSource::new(vec![0; 4]), &config(1), &analysis(4))
                .unwrap();
        assert_eq!(session.dominant_frequency_hz(), None);
    }
}
