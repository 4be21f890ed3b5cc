//! Encoder state carried from the audio context to the UI tick.
//!
//! The encoder is sampled once per block in the audio interrupt, but the
//! state machine runs every 20 ms. The latch accumulates in between:
//! detents add up, a release edge sticks until taken, and the hold time
//! keeps its maximum.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use platform::ControlSample;
use ui::ControlFrame;

/// Accumulated encoder input.
#[derive(Default)]
pub struct ControlLatch {
    increment: AtomicI32,
    released: AtomicBool,
    held_ms: AtomicU32,
}

impl ControlLatch {
    /// Idle latch.
    pub const fn new() -> Self {
        Self {
            increment: AtomicI32::new(0),
            released: AtomicBool::new(false),
            held_ms: AtomicU32::new(0),
        }
    }

    /// Fold in one block's sample. Audio context only.
    pub fn record(&self, sample: ControlSample) {
        if sample.increment != 0 {
            self.increment.fetch_add(sample.increment, Ordering::Relaxed);
        }
        if sample.released {
            self.released.store(true, Ordering::Relaxed);
        }
        if sample.held_ms > 0 {
            self.held_ms.fetch_max(sample.held_ms, Ordering::Relaxed);
        }
    }

    /// Take everything since the previous call. Main loop only.
    pub fn take(&self) -> ControlFrame {
        ControlFrame {
            increment: self.increment.swap(0, Ordering::Relaxed),
            released: self.released.swap(false, Ordering::Relaxed),
            held_ms: self.held_ms.swap(0, Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_accumulates_between_takes() {
        let latch = ControlLatch::new();
        latch.record(ControlSample {
            increment: 1,
            ..ControlSample::default()
        });
        latch.record(ControlSample {
            increment: 2,
            held_ms: 300,
            ..ControlSample::default()
        });
        latch.record(ControlSample {
            released: true,
            held_ms: 120,
            ..ControlSample::default()
        });
        assert_eq!(
            latch.take(),
            ControlFrame {
                increment: 3,
                released: true,
                held_ms: 300,
            }
        );
        assert_eq!(latch.take(), ControlFrame::default());
    }
}
