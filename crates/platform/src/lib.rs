//! Hardware Abstraction Layer (HAL) for the patchbox runtime
//!
//! This crate provides the trait boundary between the runtime core and the
//! board: clocks, the encoder, the MIDI UART, removable storage and the
//! monochrome display. Everything here is synchronous; the runtime is a
//! polled superloop plus one audio interrupt, so no executor is involved.
//!
//! # Architecture Layers
//!
//! ```text
//! Orchestrator (runtime crate: AudioEngine + MainLoop)
//!         ↓
//! Subsystems (midi, wav, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Board support (libDaisy-style drivers, not part of this workspace)
//! ```
//!
//! # Abstractions
//!
//! - [`Clock`] - monotonic millisecond / microsecond counters
//! - [`ControlInput`] - rotary encoder with push switch, plus knobs
//! - [`MidiUart`] - non-blocking byte receive / transmit
//! - [`Storage`] / [`File`] - read, seek and eof over removable media
//! - [`Display`] - 1-bit `DrawTarget` with an explicit flush
//! - [`Capabilities`] - which of the above a given board actually has
//!
//! # Features
//!
//! - `std`: Enable the host [`mocks`]
//! - `defmt`: Enable `defmt::Format` derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod absent;
pub mod audio;
pub mod capabilities;
pub mod clock;
pub mod config;
pub mod display;
pub mod input;
pub mod storage;
pub mod uart;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-exports
pub use audio::AudioConfig;
pub use capabilities::Capabilities;
pub use clock::Clock;
pub use config::RuntimeConfig;
pub use display::Display;
pub use input::{ControlInput, ControlSample};
pub use storage::{File, Storage};
pub use uart::{MidiUart, TransmitError};
