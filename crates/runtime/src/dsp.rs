//! The contract between the runtime and a loaded app's audio transform.

use midi::{MidiMessage, MidiSink};

use crate::arena::Arena;

/// Why a block could not be processed. The runtime outputs silence for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessingFault {
    /// A required buffer was missing
    #[error("missing audio buffer")]
    NullBuffer,
    /// App-specific failure code
    #[error("app fault {0}")]
    Internal(i32),
}

impl ProcessingFault {
    /// Non-zero status code shown on the console.
    pub fn code(&self) -> i32 {
        match self {
            Self::NullBuffer => -1,
            Self::Internal(0) => -2,
            Self::Internal(code) => *code,
        }
    }
}

/// Everything one `perform` call may touch.
pub struct Process<'a, 'b> {
    /// One slice per input channel, `frames` long
    pub inputs: &'a [&'b [f32]],
    /// One slice per output channel, `frames` long
    pub outputs: &'a mut [&'b mut [f32]],
    /// Frames in this block
    pub frames: usize,
    /// Normalized knob readings
    pub knobs: &'a [f32],
    /// Raw MIDI bytes received since the previous block
    pub midi_in: &'a [u8],
    /// Outbound MIDI queue
    pub midi_out: &'a mut dyn MidiSink,
    /// The app's memory
    pub arena: &'a mut Arena,
}

/// A MIDI message that drives a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiBinding {
    /// Controller value 0..=127
    ControlChange {
        /// `None` listens on every channel
        channel: Option<u8>,
        /// Controller number
        control: u8,
    },
    /// Note-on velocity; note-off reads as zero
    Velocity {
        /// `None` listens on every channel
        channel: Option<u8>,
        /// `None` follows every note
        note: Option<u8>,
    },
    /// Pitch bend across its full range
    PitchBend {
        /// `None` listens on every channel
        channel: Option<u8>,
    },
}

impl MidiBinding {
    /// The message's value on 0.0..=1.0, or `None` when it does not match.
    pub fn unit_value(&self, message: &MidiMessage) -> Option<f32> {
        let on_channel = |wanted: Option<u8>| wanted.map_or(true, |c| Some(c) == message.channel());
        let on_note = |wanted: Option<u8>, got: u8| wanted.map_or(true, |n| n == got);
        match (*self, *message) {
            (
                Self::ControlChange { channel, control },
                MidiMessage::ControlChange { control: c, value, .. },
            ) if c == control && on_channel(channel) => Some(f32::from(value) / 127.0),
            (Self::Velocity { channel, note }, MidiMessage::NoteOn { note: n, velocity, .. })
                if on_note(note, n) && on_channel(channel) =>
            {
                Some(f32::from(velocity) / 127.0)
            }
            (Self::Velocity { channel, note }, MidiMessage::NoteOff { note: n, .. })
                if on_note(note, n) && on_channel(channel) =>
            {
                Some(0.0)
            }
            (Self::PitchBend { channel }, MidiMessage::PitchBend { value, .. })
                if on_channel(channel) =>
            {
                Some(f32::from(value) / 16_383.0)
            }
            _ => None,
        }
    }
}

/// Custom detent handler: `(current, detents) -> new value`.
pub type AdjustFn = fn(f32, i32) -> f32;

/// Description of one user-facing parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    /// Short name for the parameter list
    pub name: &'static str,
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
    /// Value after load
    pub default: f32,
    /// Unit suffix, may be empty
    pub units: &'static str,
    /// Replaces the linear 1%-per-detent step
    pub adjust: Option<AdjustFn>,
    /// MIDI control source
    pub midi: Option<MidiBinding>,
}

impl ParamInfo {
    /// Linear parameter with no units or MIDI binding.
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            units: "",
            adjust: None,
            midi: None,
        }
    }

    /// Set the unit suffix.
    #[must_use]
    pub const fn units(mut self, units: &'static str) -> Self {
        self.units = units;
        self
    }

    /// Set a custom detent handler.
    #[must_use]
    pub const fn adjust(mut self, adjust: AdjustFn) -> Self {
        self.adjust = Some(adjust);
        self
    }

    /// Bind to a MIDI message.
    #[must_use]
    pub const fn midi(mut self, binding: MidiBinding) -> Self {
        self.midi = Some(binding);
        self
    }

    /// Clamp into `min..=max`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min.min(self.max), self.max.max(self.min))
    }

    /// Apply `detents` of encoder motion to `current`.
    #[allow(clippy::cast_precision_loss)] // detent counts are small
    pub fn adjust_value(&self, current: f32, detents: i32) -> f32 {
        let next = match self.adjust {
            Some(adjust) => adjust(current, detents),
            None => current + (self.max - self.min) / 100.0 * detents as f32,
        };
        self.clamp(next)
    }

    /// Map 0.0..=1.0 onto the parameter's range.
    pub fn from_unit(&self, unit: f32) -> f32 {
        self.clamp(self.min + unit.clamp(0.0, 1.0) * (self.max - self.min))
    }
}

/// A loaded app's audio transform.
///
/// `perform` runs in the audio interrupt: no blocking, no storage, and no
/// allocation other than from `block.arena`.
pub trait Dsp {
    /// Input channels required.
    fn num_inputs(&self) -> usize;

    /// Output channels produced.
    fn num_outputs(&self) -> usize;

    /// Called once after load, before the first block.
    fn reset(&mut self, sample_rate: f32, block_size: usize);

    /// Process one block.
    fn perform(&mut self, block: &mut Process<'_, '_>) -> Result<(), ProcessingFault>;

    /// Parameter descriptions, index-aligned with `set_parameter`.
    fn params(&self) -> &'static [ParamInfo] {
        &[]
    }

    /// Set a parameter by index. Out-of-range indices are ignored.
    fn set_parameter(&mut self, index: usize, value: f32) {
        let _ = (index, value);
    }

    /// Read a parameter by index.
    fn parameter(&self, index: usize) -> f32 {
        self.params().get(index).map_or(0.0, |p| p.default)
    }
}
