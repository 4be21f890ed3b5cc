//! Streaming RIFF/WAVE loader for sample buffers.
//!
//! Reads PCM WAV files from removable storage straight into a caller-owned
//! interleaved `f32` buffer, a small window at a time. Nothing is
//! allocated and memory use does not depend on file size.
//!
//! # Supported input
//!
//! | format tag | bits | scale        |
//! |------------|------|--------------|
//! | 1 (PCM)    | 16   | 1 / 2^15     |
//! | 1 (PCM)    | 24   | 1 / 2^23     |
//! | 1 (PCM)    | 32   | 1 / 2^31     |
//!
//! Any channel count is accepted; source channels are mapped onto the
//! destination's channels modulo the source count.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod convert;
pub mod error;
pub mod format;
pub mod loader;

pub use error::WavError;
pub use format::{SampleFormat, WavFormat};
pub use loader::{load, read_wav, LoadReport, SCRATCH_BYTES};
