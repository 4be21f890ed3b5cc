//! Shared fixtures: a small app table and a mock board.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use midi::{MidiNote, MidiSink};
use platform::mocks::{MockClock, MockControls, MockDisplay, MockStorage, MockUart};
use platform::{AudioConfig, Capabilities, RuntimeConfig};
use runtime::{
    AppDef, Arena, AudioEngine, Block, Dsp, LoadContext, LoadError, MainLoop, MidiBinding,
    ParamInfo, Peripherals, Process, ProcessingFault, Shared, TickContext,
};

pub const FRAMES: usize = 48;

pub static GAIN_PARAMS: [ParamInfo; 1] = [ParamInfo::new("gain", 0.0, 2.0, 1.0)
    .units("x")
    .midi(MidiBinding::ControlChange {
        channel: None,
        control: 7,
    })];

/// Every app the tests install, as one type.
pub enum TestApp {
    /// Stereo gain with one MIDI-mapped parameter
    Gain { gain: f32 },
    /// Always fails with code 3
    Fault,
    /// MIDI thru plus a held middle C
    Echo { note: MidiNote },
    /// Loops a mono sample to both outputs
    Sampler { block: Block, frames: usize, pos: usize },
}

impl Dsp for TestApp {
    fn num_inputs(&self) -> usize {
        match self {
            Self::Gain { .. } => 2,
            _ => 0,
        }
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn reset(&mut self, _sample_rate: f32, _block_size: usize) {}

    fn perform(&mut self, block: &mut Process<'_, '_>) -> Result<(), ProcessingFault> {
        match self {
            Self::Gain { gain } => {
                for (out, inp) in block.outputs.iter_mut().zip(block.inputs.iter()) {
                    for (o, i) in out.iter_mut().zip(inp.iter()) {
                        *o = *i * *gain;
                    }
                }
                Ok(())
            }
            Self::Fault => Err(ProcessingFault::Internal(3)),
            Self::Echo { note } => {
                if !block.midi_in.is_empty() {
                    let _ = block.midi_out.send_bytes(block.midi_in);
                }
                let _ = note.update(block.midi_out, 100, 60, 0);
                for out in block.outputs.iter_mut() {
                    out.fill(0.25);
                }
                Ok(())
            }
            Self::Sampler { block: sample, frames, pos } => {
                let samples = block.arena.samples(*sample);
                for i in 0..block.frames {
                    let value = if *frames == 0 { 0.0 } else { samples[*pos] };
                    for out in block.outputs.iter_mut() {
                        out[i] = value;
                    }
                    if *frames > 0 {
                        *pos = (*pos + 1) % *frames;
                    }
                }
                Ok(())
            }
        }
    }

    fn params(&self) -> &'static [ParamInfo] {
        match self {
            Self::Gain { .. } => &GAIN_PARAMS,
            _ => &[],
        }
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        if let (Self::Gain { gain }, 0) = (self, index) {
            *gain = value;
        }
    }

    fn parameter(&self, index: usize) -> f32 {
        match (self, index) {
            (Self::Gain { gain }, 0) => *gain,
            _ => 0.0,
        }
    }
}

fn load_gain(_: &mut LoadContext<'_, MockStorage>) -> Result<TestApp, LoadError> {
    Ok(TestApp::Gain { gain: 1.0 })
}

fn load_fault(_: &mut LoadContext<'_, MockStorage>) -> Result<TestApp, LoadError> {
    Ok(TestApp::Fault)
}

fn load_echo(_: &mut LoadContext<'_, MockStorage>) -> Result<TestApp, LoadError> {
    Ok(TestApp::Echo {
        note: MidiNote::new(),
    })
}

fn load_sampler(ctx: &mut LoadContext<'_, MockStorage>) -> Result<TestApp, LoadError> {
    let block = ctx.allocate_samples(256)?;
    let report = ctx.load_wav("kick.wav", block, 1)?;
    Ok(TestApp::Sampler {
        block,
        frames: report.frames,
        pos: 0,
    })
}

pub const GAIN: AppDef<TestApp, MockStorage> = AppDef::new("gain", load_gain);
pub const FAULT: AppDef<TestApp, MockStorage> = AppDef::new("fault", load_fault);
pub const ECHO: AppDef<TestApp, MockStorage> = AppDef::new("echo", load_echo);
pub const SAMPLER: AppDef<TestApp, MockStorage> = AppDef::new("sampler", load_sampler);

/// Prints the tick interval and the gain parameter from the main loop.
fn meter_tick(ctx: &mut TickContext<'_>) {
    let gain = ctx.params.get(0);
    let dt_ms = ctx.dt_ms;
    ctx.log(format_args!("dt {} gain {}", dt_ms, gain));
}

/// The gain app with a main loop hook.
pub const METER: AppDef<TestApp, MockStorage> =
    AppDef::new("meter", load_gain).with_tick(meter_tick);

pub fn leak(len: usize) -> &'static mut [u8] {
    Box::leak(vec![0u8; len].into_boxed_slice())
}

pub fn shared() -> Shared<TestApp> {
    Shared::new(Arena::new(leak(4 * 1024), leak(64 * 1024)))
}

/// Handles kept by the test after the runtime takes its clones.
#[derive(Clone, Default)]
pub struct Board {
    pub storage: MockStorage,
    pub uart: MockUart,
    pub display: MockDisplay,
    pub clock: MockClock,
    pub controls: MockControls,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose waits really sleep, for tests with an audio thread.
    pub fn threaded() -> Self {
        Self {
            clock: MockClock::sleeping(),
            ..Self::new()
        }
    }

    pub fn main_loop<'a>(
        &self,
        shared: &'a Shared<TestApp>,
        apps: &'a [AppDef<TestApp, MockStorage>],
    ) -> MainLoop<'a, TestApp, MockStorage, MockUart, MockDisplay, MockClock> {
        MainLoop::new(
            shared,
            apps,
            Peripherals {
                storage: Some(self.storage.clone()),
                uart: Some(self.uart.clone()),
                display: Some(self.display.clone()),
            },
            self.clock.clone(),
            Capabilities::FIELD,
            AudioConfig::default(),
            RuntimeConfig::default(),
        )
        .unwrap()
    }

    pub fn engine<'a>(
        &self,
        shared: &'a Shared<TestApp>,
    ) -> AudioEngine<'a, TestApp, MockControls, MockClock> {
        AudioEngine::new(
            shared,
            self.controls.clone(),
            self.clock.clone(),
            AudioConfig::default(),
        )
        .unwrap()
    }
}

/// Run one block with constant inputs, returning the two output channels.
pub fn block(
    engine: &mut AudioEngine<'_, TestApp, MockControls, MockClock>,
    level: f32,
) -> [Vec<f32>; 2] {
    let left = vec![level; FRAMES];
    let right = vec![level; FRAMES];
    let mut out_l = vec![9.0; FRAMES];
    let mut out_r = vec![9.0; FRAMES];
    engine.process(
        &[left.as_slice(), right.as_slice()],
        &mut [out_l.as_mut_slice(), out_r.as_mut_slice()],
    );
    [out_l, out_r]
}

/// Mono 16-bit WAV holding `samples`.
pub fn wav16(samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&48_000u32.to_le_bytes());
    out.extend_from_slice(&96_000u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}
