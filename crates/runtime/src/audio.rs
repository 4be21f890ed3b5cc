//! The audio-interrupt half of the runtime.
//!
//! # Block sequence
//!
//! ```text
//! sample encoder ─▶ drain MIDI in ─▶ gate? ──no──▶ silence
//!                                     │yes
//!                                     ▼
//!            apply dirty params + MIDI-bound params
//!                                     ▼
//!                 perform ──Err──▶ silence + record fault (new run after a clean block)
//!                                     ▼
//!                     scope trace ─▶ cpu time
//! ```
//!
//! Nothing here blocks, allocates, or touches storage or the display.

use core::sync::atomic::Ordering;

use midi::MidiParser;
use platform::config::MIDI_BUFFER_SIZE;
use platform::{AudioConfig, Clock, ControlInput};
use ui::{ScopeSource, Zoom};

use crate::dsp::{Dsp, Process, ProcessingFault};
use crate::error::RuntimeError;
use crate::params::dirty_indices;
use crate::shared::{Shared, Slot, SCOPE_CHANNELS};

/// Knob readings forwarded to the app.
pub const MAX_KNOBS: usize = 8;

/// Per-block driver, owned by the codec interrupt.
pub struct AudioEngine<'a, A, C, K> {
    shared: &'a Shared<A>,
    controls: C,
    clock: K,
    config: AudioConfig,
    parser: MidiParser,
    midi_scratch: [u8; MIDI_BUFFER_SIZE],
    knobs: [f32; MAX_KNOBS],
    faulting: bool,
}

impl<'a, A, C, K> AudioEngine<'a, A, C, K>
where
    A: Dsp + Send,
    C: ControlInput,
    K: Clock,
{
    /// Claim the audio half of `shared`. Fails if an engine already exists.
    pub fn new(
        shared: &'a Shared<A>,
        controls: C,
        clock: K,
        config: AudioConfig,
    ) -> Result<Self, RuntimeError> {
        shared.claim_audio()?;
        Ok(Self {
            shared,
            controls,
            clock,
            config,
            parser: MidiParser::new(),
            midi_scratch: [0; MIDI_BUFFER_SIZE],
            knobs: [0.0; MAX_KNOBS],
            faulting: false,
        })
    }

    /// Stream configuration this engine was created with.
    pub fn config(&self) -> AudioConfig {
        self.config
    }

    /// Process one block of non-interleaved audio.
    pub fn process<'b>(&mut self, inputs: &[&'b [f32]], outputs: &mut [&'b mut [f32]]) {
        let start = self.clock.now_us();
        let shared = self.shared;

        shared.controls.record(self.controls.sample());
        let knob_count = self.controls.read_knobs(&mut self.knobs);
        let midi_len = shared.midi.read_inbound(&mut self.midi_scratch);

        let knobs = self.knobs.get(..knob_count).unwrap_or_default();
        let midi_in = self.midi_scratch.get(..midi_len).unwrap_or_default();
        let parser = &mut self.parser;

        let outcome = shared
            .slot
            .audio_with(|slot| run(shared, slot, parser, inputs, &mut *outputs, knobs, midi_in));

        match outcome {
            Some(Ok(())) => self.faulting = false,
            Some(Err(fault)) => {
                silence(outputs);
                shared.record_fault(fault.code(), !self.faulting);
                self.faulting = true;
            }
            None => {
                silence(outputs);
                self.faulting = false;
            }
        }

        if shared.scope_enabled.load(Ordering::Acquire) {
            trace(shared, inputs, outputs);
        }

        let elapsed = self.clock.now_us().wrapping_sub(start);
        shared.cpu_us.store(elapsed, Ordering::Relaxed);
    }
}

fn silence(outputs: &mut [&mut [f32]]) {
    for channel in outputs.iter_mut() {
        channel.fill(0.0);
    }
}

fn run<'b, A: Dsp>(
    shared: &Shared<A>,
    slot: &mut Slot<A>,
    parser: &mut MidiParser,
    inputs: &[&'b [f32]],
    outputs: &mut [&'b mut [f32]],
    knobs: &[f32],
    midi_in: &[u8],
) -> Result<(), ProcessingFault> {
    let Slot { arena, app } = slot;
    let Some(app) = app.as_mut() else {
        silence(outputs);
        return Ok(());
    };

    for index in dirty_indices(shared.params.take_dirty()) {
        app.set_parameter(index, shared.params.get(index));
    }

    let params = app.params();
    for &byte in midi_in {
        let Some(message) = parser.push(byte) else {
            continue;
        };
        for (index, info) in params.iter().enumerate() {
            if let Some(unit) = info.midi.and_then(|b| b.unit_value(&message)) {
                let value = info.from_unit(unit);
                app.set_parameter(index, value);
                shared.params.mirror(index, value);
            }
        }
    }

    if inputs.len() < app.num_inputs() || outputs.len() < app.num_outputs() {
        return Err(ProcessingFault::NullBuffer);
    }
    let frames = outputs
        .iter()
        .map(|c| c.len())
        .chain(inputs.iter().map(|c| c.len()))
        .min()
        .unwrap_or(0);

    let mut sink = &shared.midi;
    let mut block = Process {
        inputs,
        outputs,
        frames,
        knobs,
        midi_in,
        midi_out: &mut sink,
        arena,
    };
    app.perform(&mut block)
}

fn trace<A>(shared: &Shared<A>, inputs: &[&[f32]], outputs: &[&mut [f32]]) {
    let zoom = Zoom::new(shared.scope_zoom.load(Ordering::Relaxed)).unwrap_or_default();
    let source = ScopeSource::from_u8(shared.scope_source.load(Ordering::Relaxed));

    let mut views: [&[f32]; SCOPE_CHANNELS] = [&[]; SCOPE_CHANNELS];
    let mut count: usize = 0;
    match source {
        ScopeSource::Outputs => {
            for (view, channel) in views.iter_mut().zip(outputs.iter()) {
                *view = &**channel;
                count = count.saturating_add(1);
            }
        }
        ScopeSource::Inputs => {
            for (view, channel) in views.iter_mut().zip(inputs.iter()) {
                *view = *channel;
                count = count.saturating_add(1);
            }
        }
    }
    if let Some(channels) = views.get(..count).filter(|c| !c.is_empty()) {
        shared.scope.store(channels, zoom);
    }
}
