//! Operator UI: modes, the encoder state machine, scope trace, console and
//! rendering.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless` +
//! `embedded-graphics`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod console;
pub mod machine;
pub mod mode;
pub mod render;
pub mod scope;

pub use console::{Console, OledConsole};
pub use machine::{ControlFrame, ModeMachine, ParamAdjust, PressThresholds, ScopeOption};
pub use mode::{Mode, ModeSet};
pub use scope::{ScopeSettings, ScopeSource, ScopeStyle, ScopeTrace, Zoom};
