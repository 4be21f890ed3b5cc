//! Audio stream description

use crate::config::{BLOCK_SIZE, DEFAULT_SAMPLE_RATE};

/// Audio stream configuration reported by the codec driver.
///
/// The driver calls the audio callback once per block with `block_size`
/// frames of non-interleaved `f32` samples per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Frames per audio callback
    pub block_size: usize,
}

impl AudioConfig {
    /// Duration of one block in microseconds, the 100% CPU budget.
    pub fn block_period_us(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)] // block sizes are small
        let frames = self.block_size as f32;
        if self.sample_rate > 0.0 {
            frames * 1_000_000.0 / self.sample_rate
        } else {
            0.0
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: BLOCK_SIZE,
        }
    }
}
