//! Channel-voice and realtime MIDI messages.
//!
//! Encoding produces the 1–3 wire bytes of a message; [`MidiParser`]
//! turns an inbound byte stream back into messages, honouring running
//! status so a stream of `[0x90, 60, 100, 62, 100]` yields two note-ons.

/// Status byte for a system realtime clock tick.
pub const CLOCK: u8 = 0xF8;
/// Status byte for transport start.
pub const START: u8 = 0xFA;
/// Status byte for transport continue.
pub const CONTINUE: u8 = 0xFB;
/// Status byte for transport stop.
pub const STOP: u8 = 0xFC;

/// Channel used for drum triggers (channel 10, zero-based 9).
pub const DRUM_CHANNEL: u8 = 9;

/// A decoded MIDI message. Channels are zero-based (0..=15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiMessage {
    /// Key released
    NoteOff {
        /// Channel 0..=15
        channel: u8,
        /// Key number
        note: u8,
        /// Release velocity
        velocity: u8,
    },
    /// Key pressed (velocity 0 is sent as-is)
    NoteOn {
        /// Channel 0..=15
        channel: u8,
        /// Key number
        note: u8,
        /// Strike velocity
        velocity: u8,
    },
    /// Per-key aftertouch
    PolyPressure {
        /// Channel 0..=15
        channel: u8,
        /// Key number
        note: u8,
        /// Pressure amount
        pressure: u8,
    },
    /// Controller change
    ControlChange {
        /// Channel 0..=15
        channel: u8,
        /// Controller number
        control: u8,
        /// Controller value
        value: u8,
    },
    /// Program change
    ProgramChange {
        /// Channel 0..=15
        channel: u8,
        /// Program number
        program: u8,
    },
    /// Channel aftertouch
    ChannelPressure {
        /// Channel 0..=15
        channel: u8,
        /// Pressure amount
        pressure: u8,
    },
    /// Pitch wheel, 14-bit with 8192 at rest
    PitchBend {
        /// Channel 0..=15
        channel: u8,
        /// Bend amount 0..=16383
        value: u16,
    },
    /// Single-byte system realtime message (clock, start, stop, ...)
    Realtime(u8),
}

/// Wire bytes of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    bytes: [u8; 3],
    len: usize,
}

impl Encoded {
    fn new(bytes: [u8; 3], len: usize) -> Self {
        Self { bytes, len }
    }

    /// The encoded bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.get(..self.len).unwrap_or(&self.bytes)
    }
}

impl core::ops::Deref for Encoded {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

fn status(kind: u8, channel: u8) -> u8 {
    kind | (channel & 0x0F)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: clamped to 0..=127 first
fn to_7bit(unit: f32) -> u8 {
    (unit.clamp(0.0, 1.0) * 127.0) as u8
}

impl MidiMessage {
    /// Controller change from a 0.0..=1.0 value.
    pub fn control_change_unit(channel: u8, control: u8, value: f32) -> Self {
        Self::ControlChange {
            channel,
            control: control & 0x7F,
            value: to_7bit(value),
        }
    }

    /// Pitch bend from a -1.0..=1.0 value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: clamped to 0..=16383 first
    pub fn pitch_bend_unit(channel: u8, value: f32) -> Self {
        let raw = ((value.clamp(-1.0, 1.0) + 1.0) * 8192.0).clamp(0.0, 16383.0);
        Self::PitchBend {
            channel,
            value: raw as u16,
        }
    }

    /// Note-on on the drum channel from a 0.0..=1.0 velocity.
    pub fn drum(note: u8, velocity: f32) -> Self {
        Self::NoteOn {
            channel: DRUM_CHANNEL,
            note: note & 0x7F,
            velocity: to_7bit(velocity),
        }
    }

    /// Zero-based channel, `None` for realtime messages.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOff { channel, .. }
            | Self::NoteOn { channel, .. }
            | Self::PolyPressure { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            Self::Realtime(_) => None,
        }
    }

    /// Serialize to wire bytes.
    #[allow(clippy::cast_possible_truncation)] // Safety: masked to 7 bits
    pub fn encode(&self) -> Encoded {
        match *self {
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => Encoded::new([status(0x80, channel), note & 0x7F, velocity & 0x7F], 3),
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => Encoded::new([status(0x90, channel), note & 0x7F, velocity & 0x7F], 3),
            Self::PolyPressure {
                channel,
                note,
                pressure,
            } => Encoded::new([status(0xA0, channel), note & 0x7F, pressure & 0x7F], 3),
            Self::ControlChange {
                channel,
                control,
                value,
            } => Encoded::new([status(0xB0, channel), control & 0x7F, value & 0x7F], 3),
            Self::ProgramChange { channel, program } => {
                Encoded::new([status(0xC0, channel), program & 0x7F, 0], 2)
            }
            Self::ChannelPressure { channel, pressure } => {
                Encoded::new([status(0xD0, channel), pressure & 0x7F, 0], 2)
            }
            Self::PitchBend { channel, value } => Encoded::new(
                [
                    status(0xE0, channel),
                    (value & 0x7F) as u8,
                    ((value >> 7) & 0x7F) as u8,
                ],
                3,
            ),
            Self::Realtime(byte) => Encoded::new([byte, 0, 0], 1),
        }
    }
}

/// Running-status decoder for an inbound byte stream.
///
/// Realtime bytes are returned immediately and leave any message in
/// progress intact. System common and SysEx bytes cancel running status;
/// their data bytes are skipped.
#[derive(Debug, Clone, Default)]
pub struct MidiParser {
    status: Option<u8>,
    data: [u8; 2],
    count: usize,
}

impl MidiParser {
    /// Create a parser with no running status.
    pub const fn new() -> Self {
        Self {
            status: None,
            data: [0; 2],
            count: 0,
        }
    }

    /// Feed one byte, returning a message once it is complete.
    #[allow(clippy::arithmetic_side_effects)] // Safety: count < 2 before increment
    pub fn push(&mut self, byte: u8) -> Option<MidiMessage> {
        match byte {
            0xF8..=0xFF => {
                // 0xF9 and 0xFD are undefined
                return match byte {
                    0xF9 | 0xFD => None,
                    _ => Some(MidiMessage::Realtime(byte)),
                };
            }
            0xF0..=0xF7 => {
                self.status = None;
                self.count = 0;
                return None;
            }
            0x80..=0xEF => {
                self.status = Some(byte);
                self.count = 0;
                return None;
            }
            _ => {}
        }

        let status = self.status?;
        if let Some(slot) = self.data.get_mut(self.count) {
            *slot = byte;
        }
        self.count += 1;
        if self.count < data_len(status) {
            return None;
        }
        self.count = 0;
        Some(build(status, self.data))
    }
}

fn data_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

fn build(status: u8, data: [u8; 2]) -> MidiMessage {
    let channel = status & 0x0F;
    let [a, b] = data;
    match status & 0xF0 {
        0x80 => MidiMessage::NoteOff {
            channel,
            note: a,
            velocity: b,
        },
        0x90 => MidiMessage::NoteOn {
            channel,
            note: a,
            velocity: b,
        },
        0xA0 => MidiMessage::PolyPressure {
            channel,
            note: a,
            pressure: b,
        },
        0xB0 => MidiMessage::ControlChange {
            channel,
            control: a,
            value: b,
        },
        0xC0 => MidiMessage::ProgramChange {
            channel,
            program: a,
        },
        0xD0 => MidiMessage::ChannelPressure {
            channel,
            pressure: a,
        },
        _ => MidiMessage::PitchBend {
            channel,
            value: u16::from(a) | (u16::from(b) << 7),
        },
    }
}
