//! MIDI byte transport and message helpers.
//!
//! - [`RingBuffer`]: fixed-capacity byte queue with one reserved slot
//! - [`MidiPort`]: inbound/outbound queues shared by the audio interrupt and
//!   the main loop, plus UART polling
//! - [`MidiMessage`] / [`MidiParser`]: channel-voice encoding and a
//!   running-status decoder
//! - [`MidiNote`]: single-voice note tracker that emits on/off only on edges
//!
//! This crate is `no_std`; it only uses `core` + `heapless` + `embassy-sync`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod message;
pub mod note;
pub mod port;
pub mod ring_buffer;

pub use error::MidiError;
pub use message::{MidiMessage, MidiParser};
pub use note::{MidiNote, MidiSink};
pub use port::MidiPort;
pub use ring_buffer::RingBuffer;
