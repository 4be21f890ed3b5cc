//! State shared by the audio context and the main loop.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

use midi::MidiPort;
use platform::config::MIDI_BUFFER_SIZE;
use ui::{ScopeSource, ScopeTrace, Zoom};

use crate::arena::Arena;
use crate::controls::ControlLatch;
use crate::error::RuntimeError;
use crate::gate::{GateState, Guarded};
use crate::params::ParamBank;

/// Scope columns, one per pixel of a 128-wide panel.
pub const SCOPE_WIDTH: usize = 128;
/// Channels traced.
pub const SCOPE_CHANNELS: usize = 2;

/// MIDI queues sized by the platform config.
pub type Port = MidiPort<MIDI_BUFFER_SIZE>;
/// The oscilloscope buffer.
pub type Trace = ScopeTrace<SCOPE_WIDTH, SCOPE_CHANNELS>;

/// What the gate hands back and forth: the app and the memory it lives in.
pub(crate) struct Slot<A> {
    pub(crate) arena: Arena,
    pub(crate) app: Option<A>,
}

/// The context object both halves of the runtime hold a reference to.
///
/// Usually placed in a `static` through a cell at board bring-up; host
/// tests keep it on the stack and share it with scoped threads.
pub struct Shared<A> {
    pub(crate) slot: Guarded<Slot<A>>,
    pub(crate) controls: ControlLatch,
    pub(crate) params: ParamBank,
    pub(crate) midi: Port,
    pub(crate) scope: Trace,
    pub(crate) scope_enabled: AtomicBool,
    pub(crate) scope_zoom: AtomicU8,
    pub(crate) scope_source: AtomicU8,
    pub(crate) cpu_us: AtomicU32,
    pub(crate) fault_code: AtomicI32,
    pub(crate) fault_count: AtomicU32,
    pub(crate) fault_runs: AtomicU32,
    audio_claimed: AtomicBool,
    main_claimed: AtomicBool,
}

impl<A> Shared<A> {
    /// Empty context owning the app arena. No app is loaded and the audio
    /// context outputs silence until the main loop loads one.
    pub fn new(arena: Arena) -> Self {
        Self {
            slot: Guarded::new(Slot { arena, app: None }),
            controls: ControlLatch::new(),
            params: ParamBank::new(),
            midi: MidiPort::new(),
            scope: ScopeTrace::new(),
            scope_enabled: AtomicBool::new(false),
            scope_zoom: AtomicU8::new(Zoom::DEFAULT.level()),
            scope_source: AtomicU8::new(ScopeSource::Outputs.to_u8()),
            cpu_us: AtomicU32::new(0),
            fault_code: AtomicI32::new(0),
            fault_count: AtomicU32::new(0),
            fault_runs: AtomicU32::new(0),
            audio_claimed: AtomicBool::new(false),
            main_claimed: AtomicBool::new(false),
        }
    }

    pub(crate) fn claim_audio(&self) -> Result<(), RuntimeError> {
        if self.audio_claimed.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyClaimed);
        }
        Ok(())
    }

    pub(crate) fn claim_main(&self) -> Result<(), RuntimeError> {
        if self.main_claimed.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyClaimed);
        }
        Ok(())
    }

    /// Handshake state of the app slot.
    pub fn gate_state(&self) -> GateState {
        self.slot.state()
    }

    /// MIDI queues.
    pub fn midi(&self) -> &Port {
        &self.midi
    }

    /// Oscilloscope columns.
    pub fn scope(&self) -> &Trace {
        &self.scope
    }

    /// Parameter values.
    pub fn params(&self) -> &ParamBank {
        &self.params
    }

    /// Microseconds the last audio block took.
    pub fn cpu_us(&self) -> u32 {
        self.cpu_us.load(Ordering::Relaxed)
    }

    /// Blocks that faulted since startup.
    pub fn fault_count(&self) -> u32 {
        self.fault_count.load(Ordering::Acquire)
    }

    /// Runs of consecutive faulted blocks since startup. A run ends at the
    /// first block that completes cleanly.
    pub fn fault_runs(&self) -> u32 {
        self.fault_runs.load(Ordering::Acquire)
    }

    /// Code of the most recent fault, 0 before the first.
    pub fn last_fault_code(&self) -> i32 {
        self.fault_code.load(Ordering::Relaxed)
    }

    pub(crate) fn record_fault(&self, code: i32, starts_run: bool) {
        self.fault_code.store(code, Ordering::Relaxed);
        if starts_run {
            self.fault_runs.fetch_add(1, Ordering::Release);
        }
        self.fault_count.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn set_scope(&self, enabled: bool, zoom: Zoom, source: ScopeSource) {
        self.scope_zoom.store(zoom.level(), Ordering::Relaxed);
        self.scope_source.store(source.to_u8(), Ordering::Relaxed);
        self.scope_enabled.store(enabled, Ordering::Release);
    }
}
