//! App table entries and the context an app's loader runs in.

use core::fmt;

use platform::{AudioConfig, Capabilities, Storage};
use ui::OledConsole;
use wav::LoadReport;

use crate::arena::{Arena, Block};
use crate::error::LoadError;
use crate::log;
use crate::params::ParamBank;
use crate::shared::Port;

/// Builds an app inside a [`LoadContext`].
pub type LoadFn<A, S> = fn(&mut LoadContext<'_, S>) -> Result<A, LoadError>;

/// Runs on every main loop tick while the app is loaded.
///
/// The hook never sees the app value, which belongs to the audio context
/// while it runs. State shared with the DSP goes through the parameter bank,
/// the MIDI port, or the app's own atomics.
pub type TickFn = fn(&mut TickContext<'_>);

/// One entry in the app menu.
pub struct AppDef<A, S> {
    /// Menu label
    pub name: &'static str,
    /// Constructor, run on the main loop with audio parked
    pub load: LoadFn<A, S>,
    /// Main loop hook, for LEDs, CV and gate outs, or console messages
    pub tick: Option<TickFn>,
}

impl<A, S> AppDef<A, S> {
    /// Table entry.
    pub const fn new(name: &'static str, load: LoadFn<A, S>) -> Self {
        Self {
            name,
            load,
            tick: None,
        }
    }

    /// Run `tick` on the main loop while this app is loaded.
    #[must_use]
    pub const fn with_tick(mut self, tick: TickFn) -> Self {
        self.tick = Some(tick);
        self
    }
}

impl<A, S> Clone for AppDef<A, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, S> Copy for AppDef<A, S> {}

/// What an app may use while it is being constructed.
///
/// The arena has just been reset, so everything allocated here belongs to
/// the new app until the next swap.
pub struct LoadContext<'a, S> {
    /// The app's memory
    pub arena: &'a mut Arena,
    /// Stream the app will run at
    pub audio: AudioConfig,
    /// Board description
    pub caps: Capabilities,
    storage: Option<&'a mut S>,
    console: &'a mut OledConsole,
}

impl<'a, S: Storage> LoadContext<'a, S> {
    pub(crate) fn new(
        arena: &'a mut Arena,
        audio: AudioConfig,
        caps: Capabilities,
        storage: Option<&'a mut S>,
        console: &'a mut OledConsole,
    ) -> Self {
        Self {
            arena,
            audio,
            caps,
            storage,
            console,
        }
    }

    /// Write a line to the on-screen console.
    pub fn log(&mut self, args: fmt::Arguments<'_>) {
        self.console.log(args);
    }

    /// `true` when sample files can be loaded.
    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Reserve `size` bytes, reporting exhaustion on the console.
    pub fn allocate(&mut self, size: usize) -> Result<Block, LoadError> {
        self.arena
            .allocate(size)
            .ok_or_else(|| self.exhausted(size))
    }

    /// Reserve `count` zeroed samples, reporting exhaustion on the console.
    pub fn allocate_samples(&mut self, count: usize) -> Result<Block, LoadError> {
        self.arena
            .allocate_samples(count)
            .ok_or_else(|| self.exhausted(count.saturating_mul(4)))
    }

    fn exhausted(&mut self, requested: usize) -> LoadError {
        log::warning!("arena exhausted: {} bytes requested", requested);
        self.console.log(format_args!("no mem {requested}"));
        LoadError::AllocationExhausted { requested }
    }

    /// Load a WAV file into a sample block, interleaved at `channels`.
    ///
    /// A file that cannot be read is reported as `bad <path>`; one whose
    /// data ends early is reported as `short <path>` and still succeeds
    /// with the frames that were present.
    pub fn load_wav(
        &mut self,
        path: &str,
        block: Block,
        channels: usize,
    ) -> Result<LoadReport, LoadError> {
        let Some(storage) = self.storage.as_deref_mut() else {
            self.console.log(format_args!("no storage"));
            return Err(LoadError::NoStorage);
        };
        let dest = self.arena.samples_mut(block);
        match wav::load(storage, path, dest, channels) {
            Ok(report) => {
                if report.is_truncated() {
                    log::warning!("{} truncated: {} frames", path, report.frames);
                    self.console.log(format_args!("short {path}"));
                }
                Ok(report)
            }
            Err(err) => {
                log::warning!("{} failed: {}", path, err);
                self.console.log(format_args!("bad {path}"));
                Err(LoadError::Wav(err))
            }
        }
    }
}

/// What an app's [`TickFn`] may use.
pub struct TickContext<'a> {
    /// Milliseconds since startup
    pub now_ms: u32,
    /// Milliseconds since the previous tick
    pub dt_ms: u32,
    /// Board description
    pub caps: Capabilities,
    /// Parameter values, readable and publishable
    pub params: &'a ParamBank,
    /// MIDI queues; `&Port` is a [`midi::MidiSink`]
    pub midi: &'a Port,
    console: &'a mut OledConsole,
}

impl<'a> TickContext<'a> {
    pub(crate) fn new(
        now_ms: u32,
        dt_ms: u32,
        caps: Capabilities,
        params: &'a ParamBank,
        midi: &'a Port,
        console: &'a mut OledConsole,
    ) -> Self {
        Self {
            now_ms,
            dt_ms,
            caps,
            params,
            midi,
            console,
        }
    }

    /// Write a line to the on-screen console.
    pub fn log(&mut self, args: fmt::Arguments<'_>) {
        self.console.log(args);
    }
}
