//! Handshake that lets the main loop swap the running app.
//!
//! # Protocol
//!
//! ```text
//!           resume()                     request_park()
//!  Parked ───────────▶ Running ───────────────────────▶ ParkRequested
//!    ▲                                                        │
//!    └────────────── audio acknowledges at next block ────────┘
//! ```
//!
//! - The audio context only touches the guarded value inside
//!   [`Guarded::audio_with`], which runs the closure only in `Running` and
//!   turns a pending request into `Parked` instead.
//! - The main loop only touches it after [`Guarded::park`] has observed
//!   `Parked`. Only the main loop leaves `Parked`, so the state cannot
//!   change underneath it until it calls [`Guarded::resume`].
//!
//! Each side is owned by exactly one object ([`crate::AudioEngine`] and
//! [`crate::MainLoop`]), which [`crate::Shared`] enforces when they are
//! created.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use platform::Clock;

use crate::error::RuntimeError;

/// Where the handshake stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GateState {
    /// Audio outputs silence; main loop may touch the value
    Parked = 0,
    /// Audio runs the app every block
    Running = 1,
    /// Main loop is waiting for audio to stop
    ParkRequested = 2,
}

impl GateState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::ParkRequested,
            _ => Self::Parked,
        }
    }
}

/// A value owned alternately by the audio context and the main loop.
pub struct Guarded<T> {
    state: AtomicU8,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `state` as described in the
// module docs; the value itself moves between contexts, so it must be Send.
unsafe impl<T: Send> Sync for Guarded<T> {}

impl<T> Guarded<T> {
    /// Start parked.
    pub const fn new(value: T) -> Self {
        Self {
            state: AtomicU8::new(GateState::Parked as u8),
            value: UnsafeCell::new(value),
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        GateState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Audio side, once per block: run `f` if the app may run.
    ///
    /// Returns `None` while parked. A pending park request is acknowledged
    /// here, before the value is touched.
    pub(crate) fn audio_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        match self.state() {
            GateState::Running => {
                // SAFETY: Running means the main loop is not touching the
                // value; it can only move to ParkRequested, and it waits for
                // this side to acknowledge at a later block.
                Some(f(unsafe { &mut *self.value.get() }))
            }
            GateState::ParkRequested => {
                let _ = self.state.compare_exchange(
                    GateState::ParkRequested as u8,
                    GateState::Parked as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                None
            }
            GateState::Parked => None,
        }
    }

    /// Main side: stop the audio context from touching the value.
    ///
    /// Polls every millisecond for up to `timeout_ms`. On timeout the
    /// request is withdrawn so the running app keeps playing, unless the
    /// audio side acknowledged in the meantime.
    pub(crate) fn park<C: Clock>(&self, clock: &C, timeout_ms: u32) -> Result<(), RuntimeError> {
        let _ = self.state.compare_exchange(
            GateState::Running as u8,
            GateState::ParkRequested as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        let mut waited = 0u32;
        loop {
            if self.state() == GateState::Parked {
                return Ok(());
            }
            if waited >= timeout_ms {
                break;
            }
            clock.delay_ms(1);
            waited = waited.saturating_add(1);
        }

        match self.state.compare_exchange(
            GateState::ParkRequested as u8,
            GateState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Err(raw) if GateState::from_u8(raw) == GateState::Parked => Ok(()),
            _ => Err(RuntimeError::AudioStalled { timeout_ms }),
        }
    }

    /// Main side: touch the value. `None` unless parked.
    pub(crate) fn parked_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if self.state() != GateState::Parked {
            return None;
        }
        // SAFETY: Parked was observed, and only this side leaves Parked.
        Some(f(unsafe { &mut *self.value.get() }))
    }

    /// Main side: let the audio context run the value again.
    pub(crate) fn resume(&self) {
        self.state
            .store(GateState::Running as u8, Ordering::Release);
    }
}
