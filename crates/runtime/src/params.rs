//! Parameter values shared between the UI and the audio context.
//!
//! The main loop publishes encoder edits with [`ParamBank::publish`], which
//! sets a dirty bit. The audio context collects the mask once per block and
//! hands each changed value to the app before `perform`. MIDI-driven values
//! flow the other way through [`ParamBank::mirror`] so the parameter view
//! follows the controller without re-applying it.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Parameters tracked per app (one dirty bit each).
pub const MAX_PARAMS: usize = 32;

/// Lock-free parameter values plus a change mask.
pub struct ParamBank {
    values: [AtomicU32; MAX_PARAMS],
    dirty: AtomicU32,
    count: AtomicUsize,
}

impl ParamBank {
    /// Empty bank.
    pub const fn new() -> Self {
        Self {
            values: [const { AtomicU32::new(0) }; MAX_PARAMS],
            dirty: AtomicU32::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Number of parameters the running app exposes.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Forget every value and pending change, then size for `count`.
    pub fn reset(&self, count: usize) {
        for value in &self.values {
            value.store(0, Ordering::Relaxed);
        }
        self.dirty.store(0, Ordering::Relaxed);
        self.count.store(count.min(MAX_PARAMS), Ordering::Release);
    }

    /// Store a value for the audio context to apply. Main loop only.
    pub fn publish(&self, index: usize, value: f32) {
        let Some(slot) = self.values.get(index) else {
            return;
        };
        slot.store(value.to_bits(), Ordering::Relaxed);
        #[allow(clippy::arithmetic_side_effects)] // Safety: index < MAX_PARAMS = 32
        self.dirty.fetch_or(1 << index, Ordering::Release);
    }

    /// Store a value without marking it dirty.
    pub fn mirror(&self, index: usize, value: f32) {
        if let Some(slot) = self.values.get(index) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Current value, 0.0 past the end.
    pub fn get(&self, index: usize) -> f32 {
        self.values
            .get(index)
            .map_or(0.0, |v| f32::from_bits(v.load(Ordering::Relaxed)))
    }

    /// Collect and clear the change mask. Audio context only.
    pub fn take_dirty(&self) -> u32 {
        self.dirty.swap(0, Ordering::Acquire)
    }
}

impl Default for ParamBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of the set bits in `mask`, lowest first.
pub fn dirty_indices(mut mask: u32) -> impl Iterator<Item = usize> {
    core::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let index = mask.trailing_zeros();
        mask &= mask.wrapping_sub(1);
        usize::try_from(index).ok()
    })
}
