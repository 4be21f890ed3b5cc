//! Real-time runtime core for the patchbox audio device.
//!
//! Two execution contexts share one [`Shared`] context object:
//!
//! ```text
//!  codec interrupt ──▶ AudioEngine::process ─┐          ┌─ MainLoop::tick ◀── superloop
//!                                            ▼          ▼
//!                     ┌────────────────── Shared ──────────────────┐
//!                     │ Guarded<Slot>  (arena + running app)       │
//!                     │ ControlLatch   (encoder counters)          │
//!                     │ ParamBank      (values + dirty mask)       │
//!                     │ MidiPort       (inbound / outbound rings)  │
//!                     │ ScopeTrace     (min/max columns)           │
//!                     └────────────────────────────────────────────┘
//! ```
//!
//! The audio context runs the DSP transform of the loaded app once per
//! block. The main loop owns the UI, storage, display and UART, and swaps
//! apps by parking the audio context first (see [`gate`]).
//!
//! # Features
//!
//! - `defmt` - log through defmt (hardware)
//! - `tracing` - log through tracing (host)
//! - `std` - host mocks from the platform crate

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod log;

pub mod app;
pub mod arena;
pub mod audio;
pub mod controls;
pub mod dsp;
pub mod error;
pub mod gate;
pub mod main_loop;
pub mod params;
pub mod shared;

pub use app::{AppDef, LoadContext, LoadFn, TickContext, TickFn};
pub use arena::{Arena, ArenaUsage, Block, Pool};
pub use audio::AudioEngine;
pub use controls::ControlLatch;
pub use dsp::{AdjustFn, Dsp, MidiBinding, ParamInfo, Process, ProcessingFault};
pub use error::{LoadError, RuntimeError};
pub use gate::GateState;
pub use main_loop::{MainLoop, Peripherals, UiTimer};
pub use params::{ParamBank, MAX_PARAMS};
pub use shared::Shared;
