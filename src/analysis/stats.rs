//! Aggregate statistics over a raw spectrum frame.

/// Energy and dominant bin of one raw (unsmoothed) frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Root-mean-square magnitude (0..=255)
    pub energy: f32,
    /// Index of the loudest bin; the lowest index wins ties
    pub dominant_bin: usize,
}

impl FrameStats {
    /// Compute energy and dominant bin in a single pass.
    pub fn from_frame(frame: &[u8]) -> Self {
        let mut sum_squares = 0.0f64;
        let mut peak = 0u8;
        let mut dominant_bin = 0;

        for (i, &value) in frame.iter().enumerate() {
            sum_squares += (value as f64) * (value as f64);
            if value > peak {
                peak = value;
                dominant_bin = i;
            }
        }

        let energy = (sum_squares / frame.len().max(1) as f64).sqrt() as f32;
        Self {
            energy,
            dominant_bin,
        }
    }

    /// Energy as a percentage of full scale, capped at 100
    pub fn energy_percent(&self) -> f32 {
        (self.energy / 255.0 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_zero_energy() {
        let stats = FrameStats::from_frame(&[0; 256]);
        assert_eq!(stats.energy, 0.0);
        assert_eq!(stats.dominant_bin, 0);
    }

    #[test]
    fn test_any_signal_has_positive_energy() {
        let mut frame = [0u8; 256];
        frame[200] = 1;
        let stats = FrameStats::from_frame(&frame);
        assert!(stats.energy > 0.0);
        assert_eq!(stats.dominant_bin, 200);
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let stats = FrameStats::from_frame(&[5, 5, 3]);
        assert_eq!(stats.dominant_bin, 0);

        let stats = FrameStats::from_frame(&[1, 9, 4, 9]);
        assert_eq!(stats.dominant_bin, 1);
    }

    #[test]
    fn test_rms_value() {
        // sqrt((3^2 + 4^2) / 2) = sqrt(12.5)
        let stats = FrameStats::from_frame(&[3, 4]);
        assert!((stats.energy - 12.5f32.sqrt()).abs() < 1e-6);

        let stats = FrameStats::from_frame(&[255; 8]);
        assert_eq!(stats.energy, 255.0);
        assert_eq!(stats.energy_percent(), 100.0);
    }

    #[test]
    fn test_empty_frame() {
        let stats = FrameStats::from_frame(&[]);
        assert_eq!(stats, FrameStats::default());
    }
}
