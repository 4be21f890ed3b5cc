//! Drives the runtime on the host with mock peripherals.
//!
//! Two apps are installed: a MIDI-controlled gain that reports its level
//! from the main loop, and a four-step arpeggiator that plays through the
//! MIDI UART. After a few hundred blocks
//! the simulation switches apps through the menu, then prints the console.
//!
//! ```text
//! RUST_LOG=debug cargo run -p runtime --example host_sim --features std,tracing
//! ```

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]

use std::sync::atomic::{AtomicU32, Ordering};

use midi::MidiNote;
use platform::mocks::{MockClock, MockControls, MockDisplay, MockStorage, MockUart};
use platform::{config, AudioConfig, Capabilities, RuntimeConfig};
use runtime::{
    AppDef, Arena, AudioEngine, Dsp, LoadContext, LoadError, MainLoop, MidiBinding, ParamInfo,
    Peripherals, Process, ProcessingFault, RuntimeError, Shared, TickContext,
};

static GAIN_PARAMS: [ParamInfo; 1] = [ParamInfo::new("level", 0.0, 1.0, 0.5)
    .midi(MidiBinding::ControlChange {
        channel: None,
        control: 7,
    })];

static ARP_PARAMS: [ParamInfo; 1] = [ParamInfo::new("rate", 1.0, 16.0, 4.0).units("hz")];

const PATTERN: [u8; 4] = [60, 64, 67, 72];

enum Patch {
    Gain { level: f32 },
    Arp {
        note: MidiNote,
        rate: f32,
        step: usize,
        phase: f32,
        sample_rate: f32,
    },
}

impl Dsp for Patch {
    fn num_inputs(&self) -> usize {
        match self {
            Self::Gain { .. } => 2,
            Self::Arp { .. } => 0,
        }
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn reset(&mut self, rate: f32, _block_size: usize) {
        if let Self::Arp { sample_rate, .. } = self {
            *sample_rate = rate;
        }
    }

    fn perform(&mut self, block: &mut Process<'_, '_>) -> Result<(), ProcessingFault> {
        match self {
            Self::Gain { level } => {
                for (out, inp) in block.outputs.iter_mut().zip(block.inputs.iter()) {
                    for (o, i) in out.iter_mut().zip(inp.iter()) {
                        *o = *i * *level;
                    }
                }
            }
            Self::Arp {
                note,
                rate,
                step,
                phase,
                sample_rate,
            } => {
                #[allow(clippy::cast_precision_loss)]
                let advance = *rate * block.frames as f32 / *sample_rate;
                *phase += advance;
                if *phase >= 1.0 {
                    *phase -= 1.0;
                    *step = (*step + 1) % PATTERN.len();
                }
                // a full outbound queue only delays the next edge
                let _ = note.update(block.midi_out, 100, PATTERN[*step], 0);
                for out in block.outputs.iter_mut() {
                    out.fill(0.0);
                }
            }
        }
        Ok(())
    }

    fn params(&self) -> &'static [ParamInfo] {
        match self {
            Self::Gain { .. } => &GAIN_PARAMS,
            Self::Arp { .. } => &ARP_PARAMS,
        }
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        match (self, index) {
            (Self::Gain { level }, 0) => *level = value,
            (Self::Arp { rate, .. }, 0) => *rate = value,
            _ => {}
        }
    }

    fn parameter(&self, index: usize) -> f32 {
        match (self, index) {
            (Self::Gain { level }, 0) => *level,
            (Self::Arp { rate, .. }, 0) => *rate,
            _ => 0.0,
        }
    }
}

fn load_gain(_: &mut LoadContext<'_, MockStorage>) -> Result<Patch, LoadError> {
    Ok(Patch::Gain { level: 0.5 })
}

fn load_arp(ctx: &mut LoadContext<'_, MockStorage>) -> Result<Patch, LoadError> {
    ctx.log(format_args!("arp {} steps", PATTERN.len()));
    Ok(Patch::Arp {
        note: MidiNote::new(),
        rate: 4.0,
        step: 0,
        phase: 0.0,
        sample_rate: ctx.audio.sample_rate,
    })
}

static SINCE_REPORT_MS: AtomicU32 = AtomicU32::new(0);

/// Print the gain level on the console once a second.
fn report_level(ctx: &mut TickContext<'_>) {
    let since = SINCE_REPORT_MS.fetch_add(ctx.dt_ms, Ordering::Relaxed) + ctx.dt_ms;
    if since >= 1000 {
        SINCE_REPORT_MS.store(0, Ordering::Relaxed);
        ctx.log(format_args!("level {:.2}", ctx.params.get(0)));
    }
}

static APPS: [AppDef<Patch, MockStorage>; 2] = [
    AppDef::new("gain", load_gain).with_tick(report_level),
    AppDef::new("arp", load_arp),
];

fn main() -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let fast: &'static mut [u8] = Box::leak(vec![0u8; config::FAST_POOL_SIZE].into_boxed_slice());
    let bulk: &'static mut [u8] = Box::leak(vec![0u8; config::BULK_POOL_SIZE].into_boxed_slice());
    let shared: Shared<Patch> = Shared::new(Arena::new(fast, bulk));

    let clock = MockClock::new();
    let controls = MockControls::new();
    let uart = MockUart::new();
    let audio = AudioConfig::default();

    let mut main = MainLoop::new(
        &shared,
        &APPS,
        Peripherals {
            storage: Some(MockStorage::new()),
            uart: Some(uart.clone()),
            display: Some(MockDisplay::oled()),
        },
        clock.clone(),
        Capabilities::FIELD,
        audio,
        RuntimeConfig::default(),
    )?;
    let mut engine = AudioEngine::new(&shared, controls.clone(), clock.clone(), audio)?;
    main.start()?;

    // one step per UI period: hold, turn back to the menu, release, pick
    // the next app, press
    let script: [(usize, fn(&MockControls)); 5] = [
        (200, |c| c.hold(300)),
        (240, |c| c.turn(-1)),
        (280, |c| c.release()),
        (320, |c| c.turn(1)),
        (360, |c| c.release()),
    ];

    let input = vec![0.8f32; audio.block_size];
    let mut left = vec![0.0f32; audio.block_size];
    let mut right = vec![0.0f32; audio.block_size];
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let block_us = audio.block_period_us() as u32;

    for n in 0..2000 {
        if n == 100 {
            uart.feed(&[0xB0, 7, 100]);
        }
        if let Some((_, press)) = script.iter().find(|(at, _)| *at == n) {
            press(&controls);
        }

        engine.process(
            &[input.as_slice(), input.as_slice()],
            &mut [left.as_mut_slice(), right.as_mut_slice()],
        );
        clock.advance_us(block_us);
        main.tick();

        if n % 500 == 0 {
            tracing::info!(block = n, left = left[0], cpu_us = shared.cpu_us(), "audio");
        }
    }

    tracing::info!(
        app = main.machine().app_selected(),
        midi_out = uart.transmitted().len(),
        period_ms = config::DISPLAY_PERIOD_MS,
        "simulation done"
    );
    for line in main.console().lines() {
        tracing::info!("console: {}", line);
    }
    Ok(())
}
