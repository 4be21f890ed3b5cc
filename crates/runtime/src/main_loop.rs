//! The superloop half of the runtime.
//!
//! # Tick
//!
//! ```text
//! ┌─ scheduled load from the previous tick? ─▶ park audio, swap app
//! ├─ MIDI: UART ─▶ inbound queue, outbound queue ─▶ UART
//! ├─ report MIDI overflow and DSP faults on the console
//! ├─ the app's tick hook, if it has one
//! └─ every display period:
//!      controls ─▶ mode machine ─▶ param edits, scope settings
//!      draw mode body, stats row, selection frame ─▶ flush
//! ```
//!
//! Storage, the display and the UART are only touched here, never from the
//! audio interrupt.

use embedded_graphics::pixelcolor::BinaryColor;
use heapless::Vec;
use midi::MidiError;
use platform::{AudioConfig, Capabilities, Clock, Display, MidiUart, RuntimeConfig, Storage};
use ui::render::{self, ParamRow};
use ui::{Mode, ModeMachine, OledConsole, PressThresholds};

use crate::app::{AppDef, LoadContext, TickContext, TickFn};
use crate::arena::ArenaUsage;
use crate::dsp::{Dsp, ParamInfo};
use crate::error::{LoadError, RuntimeError};
use crate::log;
use crate::params::MAX_PARAMS;
use crate::shared::Shared;

/// Apps listed on the menu at once.
pub const MAX_APPS: usize = 16;

/// Board peripherals the main loop owns. Absent ones are `None`.
pub struct Peripherals<S, U, D> {
    /// Sample storage
    pub storage: Option<S>,
    /// MIDI UART
    pub uart: Option<U>,
    /// 1-bit display
    pub display: Option<D>,
}

/// Fires once per period of elapsed milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiTimer {
    period_ms: u32,
    elapsed_ms: u32,
}

impl UiTimer {
    /// Timer that fires every `period_ms`.
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            elapsed_ms: 0,
        }
    }

    /// Add `dt_ms`; `true` when a period has passed.
    pub fn ready(&mut self, dt_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        if self.elapsed_ms >= self.period_ms {
            self.elapsed_ms = 0;
            true
        } else {
            false
        }
    }
}

/// Orchestrator for everything outside the audio interrupt.
pub struct MainLoop<'a, A, S, U, D, K> {
    shared: &'a Shared<A>,
    apps: &'a [AppDef<A, S>],
    peripherals: Peripherals<S, U, D>,
    clock: K,
    caps: Capabilities,
    audio: AudioConfig,
    config: RuntimeConfig,
    machine: ModeMachine,
    console: OledConsole,
    timer: UiTimer,
    last_ms: u32,
    params: &'static [ParamInfo],
    hook: Option<TickFn>,
    usage: ArenaUsage,
    faults_seen: u32,
    fault_runs_seen: u32,
    fault_logged: i32,
    midi_in_lit: bool,
    midi_out_lit: bool,
}

impl<'a, A, S, U, D, K> MainLoop<'a, A, S, U, D, K>
where
    A: Dsp + Send,
    S: Storage,
    U: MidiUart,
    D: Display,
    K: Clock,
{
    /// Claim the main half of `shared`.
    pub fn new(
        shared: &'a Shared<A>,
        apps: &'a [AppDef<A, S>],
        peripherals: Peripherals<S, U, D>,
        clock: K,
        caps: Capabilities,
        audio: AudioConfig,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        if apps.is_empty() {
            return Err(RuntimeError::NoApps);
        }
        shared.claim_main()?;
        let thresholds = PressThresholds {
            long_ms: config.long_press_ms,
            super_long_ms: config.super_long_press_ms,
        };
        let last_ms = clock.now_ms();
        Ok(Self {
            shared,
            apps,
            peripherals,
            caps,
            audio,
            config,
            machine: ModeMachine::new(apps.len(), caps.inputs() > 0, thresholds),
            console: OledConsole::new(),
            timer: UiTimer::new(config.display_period_ms),
            last_ms,
            clock,
            params: &[],
            hook: None,
            usage: ArenaUsage::default(),
            faults_seen: 0,
            fault_runs_seen: 0,
            fault_logged: 0,
            midi_in_lit: false,
            midi_out_lit: false,
        })
    }

    /// Load the first app.
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        log::info!("{} {} starting", platform::config::APP_NAME, platform::config::APP_VERSION);
        self.load_app(0)
    }

    /// Run forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// One pass of the superloop.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let dt = now.wrapping_sub(self.last_ms);
        self.last_ms = now;

        if let Some(index) = self.machine.take_scheduled_load() {
            // failures are already on the console
            let _ = self.load_app(index);
        }

        self.service_midi();
        self.report_faults();

        if let Some(hook) = self.hook {
            let shared = self.shared;
            let mut ctx = TickContext::new(
                now,
                dt,
                self.caps,
                &shared.params,
                &shared.midi,
                &mut self.console,
            );
            hook(&mut ctx);
        }

        if self.timer.ready(dt) {
            self.ui_tick();
        }
    }

    /// Park audio, tear down the running app, and bring up `apps[index]`.
    ///
    /// On a load failure the audio context stays parked (silent) until the
    /// next successful load. If audio does not park in time, the running
    /// app is left untouched.
    pub fn load_app(&mut self, index: usize) -> Result<(), RuntimeError> {
        let def = *self
            .apps
            .get(index)
            .ok_or(RuntimeError::UnknownApp { index })?;
        let shared = self.shared;

        if let Err(err) = shared.slot.park(&self.clock, self.config.park_timeout_ms) {
            log::error!("{}: {}", def.name, err);
            self.console.log(format_args!("audio stalled"));
            return Err(err);
        }

        let (audio, caps) = (self.audio, self.caps);
        let storage = self.peripherals.storage.as_mut().filter(|_| caps.has_storage);
        let console = &mut self.console;
        let loaded = shared.slot.parked_with(|slot| -> Result<_, LoadError> {
            slot.app = None;
            slot.arena.reset();
            shared.midi.clear();
            shared.scope.clear();

            let mut ctx = LoadContext::new(&mut slot.arena, audio, caps, storage, console);
            let mut app = (def.load)(&mut ctx)?;
            app.reset(audio.sample_rate, audio.block_size);

            let params = app.params();
            shared.params.reset(params.len());
            for index in 0..params.len().min(MAX_PARAMS) {
                shared.params.mirror(index, app.parameter(index));
            }
            let usage = slot.arena.usage();
            slot.app = Some(app);
            Ok((params, usage))
        });

        match loaded {
            Some(Ok((params, usage))) => {
                self.params = params;
                self.hook = def.tick;
                self.usage = usage;
                shared.slot.resume();
                self.machine.app_loaded(index, params.len().min(MAX_PARAMS));
                log::info!(
                    "loaded {} fast {}/{} bulk {}/{}",
                    def.name,
                    usage.fast_used,
                    usage.fast_capacity,
                    usage.bulk_used,
                    usage.bulk_capacity
                );
                self.console.log(format_args!("loaded {}", def.name));
                self.console.log(format_args!(
                    "{}/{}K+{}/{}M",
                    usage.fast_used / 1024,
                    usage.fast_capacity / 1024,
                    usage.bulk_used / (1024 * 1024),
                    usage.bulk_capacity / (1024 * 1024)
                ));
                Ok(())
            }
            Some(Err(err)) => {
                self.params = &[];
                self.hook = None;
                self.machine.app_loaded(index, 0);
                log::error!("load failed {}: {}", def.name, err);
                self.console.log(format_args!("load failed {}", def.name));
                Err(RuntimeError::Load(err))
            }
            None => Err(RuntimeError::AudioStalled {
                timeout_ms: self.config.park_timeout_ms,
            }),
        }
    }

    fn service_midi(&mut self) {
        let shared = self.shared;
        let midi = &shared.midi;
        let uart = self.peripherals.uart.as_mut().filter(|_| self.caps.has_midi_uart);
        if let Some(uart) = uart {
            midi.receive(uart);
            if let Err(MidiError::Transmit { code }) = midi.flush(uart) {
                log::warning!("midi transmit failed: {}", code);
                self.console.log(format_args!("midi tx err {code}"));
            }
        }

        let dropped_in = midi.take_in_dropped();
        if dropped_in > 0 {
            log::warning!("midi in full, {} bytes dropped", dropped_in);
            self.console.log(format_args!("midi in full"));
        }
        let dropped_out = midi.take_out_dropped();
        if dropped_out > 0 {
            log::warning!("midi out full, {} bytes dropped", dropped_out);
            self.console.log(format_args!("midi out full"));
        }

        self.midi_in_lit |= midi.take_in_active();
        self.midi_out_lit |= midi.take_out_active();
    }

    /// One console line per run of faulted blocks, or when the code changes
    /// mid-run. Repeats only show up in the fault count.
    fn report_faults(&mut self) {
        let shared = self.shared;
        let count = shared.fault_count();
        if count == self.faults_seen {
            return;
        }
        let repeats = count.wrapping_sub(self.faults_seen);
        self.faults_seen = count;

        let runs = shared.fault_runs();
        let code = shared.last_fault_code();
        if runs == self.fault_runs_seen && code == self.fault_logged {
            return;
        }
        self.fault_runs_seen = runs;
        self.fault_logged = code;
        log::error!("dsp fault {} ({} blocks)", code, repeats);
        self.console.log(format_args!("dsp fault {code}"));
    }

    fn ui_tick(&mut self) {
        let frame = self.shared.controls.take();
        if let Some(adjust) = self.machine.handle(frame) {
            if let Some(info) = self.params.get(adjust.index) {
                let current = self.shared.params.get(adjust.index);
                let next = info.adjust_value(current, adjust.delta);
                self.shared.params.publish(adjust.index, next);
            }
        }

        let settings = self.machine.scope_settings();
        self.shared
            .set_scope(self.machine.mode() == Mode::Scope, settings.zoom, settings.source);

        self.render();
        self.midi_in_lit = false;
        self.midi_out_lit = false;
    }

    fn render(&mut self) {
        if !self.caps.has_display {
            return;
        }
        let Some(display) = self.peripherals.display.as_mut() else {
            return;
        };
        let screen = Screen {
            shared: self.shared,
            machine: &self.machine,
            console: &self.console,
            apps: self.apps,
            params: self.params,
            audio: self.audio,
            midi_in: self.midi_in_lit,
            midi_out: self.midi_out_lit,
        };
        if screen.draw(display).is_err() {
            log::warning!("display draw failed");
        }
        if display.flush().is_err() {
            log::warning!("display flush failed");
        }
    }

    /// The on-screen console.
    pub fn console(&self) -> &OledConsole {
        &self.console
    }

    /// The mode state machine.
    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    /// Arena totals after the last successful load.
    pub fn usage(&self) -> ArenaUsage {
        self.usage
    }

    /// Parameters of the running app.
    pub fn params(&self) -> &'static [ParamInfo] {
        self.params
    }

    /// The owned peripherals.
    pub fn peripherals(&self) -> &Peripherals<S, U, D> {
        &self.peripherals
    }
}

/// Everything one frame is drawn from.
struct Screen<'s, A, S> {
    shared: &'s Shared<A>,
    machine: &'s ModeMachine,
    console: &'s OledConsole,
    apps: &'s [AppDef<A, S>],
    params: &'static [ParamInfo],
    audio: AudioConfig,
    midi_in: bool,
    midi_out: bool,
}

impl<A, S> Screen<'_, A, S> {
    fn draw<D: Display>(&self, display: &mut D) -> Result<(), D::Error> {
        let machine = self.machine;
        let mode = machine.mode();
        display.clear(BinaryColor::Off)?;

        match mode {
            Mode::Scope => render::draw_scope(
                display,
                &self.shared.scope,
                machine.scope_settings(),
                machine.scope_option(),
                self.audio.sample_rate,
            )?,
            Mode::Params => {
                let rows: Vec<ParamRow<'_>, MAX_PARAMS> = self
                    .params
                    .iter()
                    .take(MAX_PARAMS)
                    .enumerate()
                    .map(|(index, info)| ParamRow {
                        name: info.name,
                        value: self.shared.params.get(index),
                        units: info.units,
                    })
                    .collect();
                render::draw_params(display, &rows, machine.param_selected(), machine.tweaking())?;
            }
            Mode::Console => render::draw_console(display, self.console)?,
            Mode::Menu => {
                let names: Vec<&str, MAX_APPS> =
                    self.apps.iter().take(MAX_APPS).map(|a| a.name).collect();
                render::draw_menu(display, &names, machine.app_selecting())?;
            }
        }

        if mode != Mode::Menu {
            let cpu = render::cpu_percent(
                self.shared.cpu_us(),
                self.audio.sample_rate,
                self.audio.block_size,
            );
            render::draw_stats(display, cpu, self.midi_in, self.midi_out)?;
        }
        if machine.selecting() {
            render::draw_selecting(display, mode.label())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_timer_fires_per_period() {
        let mut timer = UiTimer::new(20);
        assert!(!timer.ready(10));
        assert!(timer.ready(10));
        assert!(!timer.ready(19));
        assert!(timer.ready(1));
        assert!(timer.ready(100));
    }
}
