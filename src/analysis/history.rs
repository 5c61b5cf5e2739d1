//! Fixed-depth history of smoothed spectrum frames.

use std::collections::VecDeque;

use crate::error::ConfigError;

/// Rolling window of the `capacity` most recent frames, newest first.
///
/// Storage is allocated once. A push recycles the evicted frame's buffer,
/// so the steady state never allocates.
pub struct HistoryBuffer {
    /// Front = newest (age 0), back = oldest (age capacity-1)
    slots: VecDeque<Box<[u8]>>,
    bin_count: usize,
}

impl HistoryBuffer {
    /// Allocate `capacity` all-zero frames of `bin_count` bins.
    pub fn new(capacity: usize, bin_count: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::RingCount(capacity));
        }
        if bin_count == 0 {
            return Err(ConfigError::FftSize(bin_count * 2));
        }

        let slots = (0..capacity)
            .map(|_| vec![0u8; bin_count].into_boxed_slice())
            .collect();

        Ok(Self { slots, bin_count })
    }

    /// Number of frames held (the configured ring count)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bins per frame
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Insert `frame` as the newest entry, evicting the oldest.
    ///
    /// The frame is copied into the evicted slot; the caller keeps its buffer.
    ///
    /// # Panics
    /// If `frame` does not have `bin_count` bins.
    pub fn push(&mut self, frame: &[u8]) {
        assert_eq!(
            frame.len(),
            self.bin_count,
            "frame length does not match history bin count"
        );

        // Copy before rotating so a panic can never leave a half-written slot visible
        let Some(mut slot) = self.slots.pop_back() else {
            return;
        };
        slot.copy_from_slice(frame);
        self.slots.push_front(slot);
    }

    /// Frame at `age` (0 = newest), or `None` past the capacity
    pub fn get(&self, age: usize) -> Option<&[u8]> {
        self.slots.get(age).map(|slot| &slot[..])
    }

    /// Frames from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.slots.iter().map(|slot| &slot[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed() {
        let history = HistoryBuffer::new(4, 8).unwrap();
        assert_eq!(history.capacity(), 4);
        assert!(history.iter().all(|frame| frame == [0u8; 8]));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(matches!(
            HistoryBuffer::new(0, 8),
            Err(ConfigError::RingCount(0))
        ));
        assert!(HistoryBuffer::new(4, 0).is_err());
    }

    #[test]
    fn test_push_orders_newest_first() {
        let mut history = HistoryBuffer::new(3, 2).unwrap();
        let frames = [[1u8, 1], [2, 2], [3, 3]];
        for frame in &frames {
            history.push(frame);
        }

        assert_eq!(history.get(0), Some(&[3u8, 3][..]));
        assert_eq!(history.get(1), Some(&[2u8, 2][..]));
        assert_eq!(history.get(2), Some(&[1u8, 1][..]));

        history.push(&[4, 4]);
        assert_eq!(history.get(0), Some(&[4u8, 4][..]));
        assert_eq!(history.get(2), Some(&[2u8, 2][..]));
        assert!(history.iter().all(|frame| frame != [1u8, 1]));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let history = HistoryBuffer::new(3, 2).unwrap();
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_push_recycles_oldest_storage() {
        let mut history = HistoryBuffer::new(3, 4).unwrap();
        let oldest = history.get(2).unwrap().as_ptr();

        history.push(&[9, 9, 9, 9]);
        assert_eq!(history.get(0).unwrap().as_ptr(), oldest);
    }

    #[test]
    fn test_caller_buffer_stays_usable() {
        let mut history = HistoryBuffer::new(2, 3).unwrap();
        let mut scratch = [7u8, 8, 9];
        history.push(&scratch);
        scratch[0] = 0;
        assert_eq!(history.get(0), Some(&[7u8, 8, 9][..]));
    }

    #[test]
    #[should_panic]
    fn test_wrong_length_panics() {
        let mut history = HistoryBuffer::new(2, 3).unwrap();
        history.push(&[1, 2]);
    }
}
