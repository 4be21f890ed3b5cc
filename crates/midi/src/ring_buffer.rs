//! Const-generic, stack-allocated ring buffer for MIDI bytes.
//!
//! `RingBuffer<N>` has `N` slots and holds at most `N - 1` bytes: one slot
//! always stays empty so `read == write` means empty and nothing else.
//! Occupancy is derived from the two indices, `(N + write - read) % N`.
//!
//! # Constraints
//!
//! - `N >= 2`.
//! - Not interrupt-safe on its own. [`crate::MidiPort`] wraps each buffer in
//!   a critical-section mutex.

use crate::MidiError;

/// A fixed-capacity ring buffer for bytes.
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    /// Index of the next slot to read from.
    read: usize,
    /// Index of the next slot to write to.
    write: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create a new, empty ring buffer.
    ///
    /// `const` so that ring buffers may live in `static`s.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            read: 0,
            write: 0,
        }
    }

    /// Bytes currently queued.
    #[allow(clippy::arithmetic_side_effects)] // Safety: read, write < N so N + write - read cannot underflow
    pub fn len(&self) -> usize {
        (N + self.write - self.read) % N
    }

    /// Slots still writable.
    #[allow(clippy::arithmetic_side_effects)] // Safety: len() <= N - 1
    pub fn free(&self) -> usize {
        N - 1 - self.len()
    }

    /// Largest number of bytes the buffer can hold (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N.saturating_sub(1)
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// `true` when a further write would be rejected.
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Append one byte.
    ///
    /// # Errors
    ///
    /// [`MidiError::BufferFull`] when occupancy is already `N - 1`; the
    /// buffer is left unchanged.
    #[allow(clippy::indexing_slicing)] // Safety: write < N invariant
    #[allow(clippy::arithmetic_side_effects)] // Safety: wrap via % N
    pub fn push(&mut self, byte: u8) -> Result<(), MidiError> {
        if self.is_full() {
            return Err(MidiError::BufferFull { needed: 1, free: 0 });
        }
        self.buf[self.write] = byte;
        self.write = (self.write + 1) % N;
        Ok(())
    }

    /// Append a whole message or nothing.
    ///
    /// # Errors
    ///
    /// [`MidiError::BufferFull`] if `bytes` does not fit in the free space.
    /// No byte is written in that case.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        let free = self.free();
        if bytes.len() > free {
            return Err(MidiError::BufferFull {
                needed: bytes.len(),
                free,
            });
        }
        for &byte in bytes {
            self.push(byte)?;
        }
        Ok(())
    }

    /// Remove and return the oldest byte.
    #[allow(clippy::indexing_slicing)] // Safety: read < N invariant
    #[allow(clippy::arithmetic_side_effects)] // Safety: wrap via % N
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.read];
        self.read = (self.read + 1) % N;
        Some(byte)
    }

    /// Read up to `out.len()` bytes into `out`, returning how many were read.
    #[allow(clippy::arithmetic_side_effects)] // Safety: n <= out.len()
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let mut n = 0;
        for slot in out.iter_mut() {
            match self.pop() {
                Some(byte) => *slot = byte,
                None => break,
            }
            n += 1;
        }
        n
    }

    /// Longest run of queued bytes that is contiguous in memory.
    ///
    /// When the queued data wraps past the end of the storage this is only
    /// the first part; the rest becomes visible after [`Self::consume`].
    pub fn contiguous(&self) -> &[u8] {
        let end = if self.write >= self.read { self.write } else { N };
        self.buf.get(self.read..end).unwrap_or(&[])
    }

    /// Drop `n` bytes from the front, at most what is queued.
    #[allow(clippy::arithmetic_side_effects)] // Safety: n clamped to len(), wrap via % N
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len());
        self.read = (self.read + n) % N;
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
