//! Single-voice note tracking.

use crate::{MidiError, MidiMessage, RingBuffer};

/// Destination for outbound MIDI.
pub trait MidiSink {
    /// Queue one complete message's bytes, all or nothing.
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), MidiError>;

    /// Encode and queue `msg`.
    fn send(&mut self, msg: MidiMessage) -> Result<(), MidiError> {
        self.send_bytes(&msg.encode())
    }
}

impl<const N: usize> MidiSink for RingBuffer<N> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.write_all(bytes)
    }
}

impl<S: MidiSink + ?Sized> MidiSink for &mut S {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        (**self).send_bytes(bytes)
    }
}

/// One voice's note state, turned into note-on/off edges.
///
/// A DSP patch calls [`MidiNote::update`] every block with its current
/// gate velocity and pitch. Messages are only sent when the note actually
/// starts, stops, or moves to another pitch or channel; holding the same
/// values sends nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidiNote {
    channel: u8,
    pitch: u8,
    velocity: u8,
    pressure: u8,
}

impl MidiNote {
    /// Silent voice on channel 0.
    pub const fn new() -> Self {
        Self {
            channel: 0,
            pitch: 0,
            velocity: 0,
            pressure: 0,
        }
    }

    /// `true` while a note-on is outstanding.
    pub fn is_sounding(&self) -> bool {
        self.velocity > 0
    }

    /// Current pitch.
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Current channel.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Track a new gate state and emit the resulting edges.
    ///
    /// The state is always updated; if the sink rejects a message the first
    /// error is returned after every message has been attempted.
    pub fn update<S: MidiSink + ?Sized>(
        &mut self,
        sink: &mut S,
        velocity: u8,
        pitch: u8,
        channel: u8,
    ) -> Result<(), MidiError> {
        let velocity = velocity & 0x7F;
        let pitch = pitch & 0x7F;
        let channel = channel & 0x0F;
        let moved = pitch != self.pitch || channel != self.channel;

        let mut result = Ok(());
        if self.is_sounding() && (velocity == 0 || moved) {
            result = result.and(sink.send(self.note_off()));
        }
        if velocity > 0 && (!self.is_sounding() || moved) {
            result = result.and(sink.send(MidiMessage::NoteOn {
                channel,
                note: pitch,
                velocity,
            }));
        }

        self.channel = channel;
        self.pitch = pitch;
        self.velocity = velocity;
        if velocity == 0 {
            self.pressure = 0;
        }
        result
    }

    /// Send polyphonic aftertouch for the sounding note when it changes.
    pub fn pressure<S: MidiSink + ?Sized>(&mut self, sink: &mut S, pressure: u8) -> Result<(), MidiError> {
        let pressure = pressure & 0x7F;
        if !self.is_sounding() || pressure == self.pressure {
            return Ok(());
        }
        self.pressure = pressure;
        sink.send(MidiMessage::PolyPressure {
            channel: self.channel,
            note: self.pitch,
            pressure,
        })
    }

    fn note_off(&self) -> MidiMessage {
        MidiMessage::NoteOff {
            channel: self.channel,
            note: self.pitch,
            velocity: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn drain(rb: &mut RingBuffer<32>) -> heapless::Vec<u8, 32> {
        let mut out = heapless::Vec::new();
        while let Some(b) = rb.pop() {
            let _ = out.push(b);
        }
        out
    }

    #[test]
    fn test_pitch_change_sends_off_then_on() {
        let mut out = RingBuffer::<32>::new();
        let mut note = MidiNote::new();
        note.update(&mut out, 64, 60, 0).unwrap();
        assert_eq!(drain(&mut out).as_slice(), &[0x90, 60, 64]);

        note.update(&mut out, 64, 62, 0).unwrap();
        assert_eq!(drain(&mut out).as_slice(), &[0x80, 60, 0, 0x90, 62, 64]);
    }

    #[test]
    fn test_repeated_values_do_not_retrigger() {
        let mut out = RingBuffer::<32>::new();
        let mut note = MidiNote::new();
        note.update(&mut out, 64, 62, 0).unwrap();
        drain(&mut out);
        note.update(&mut out, 64, 62, 0).unwrap();
        note.update(&mut out, 64, 62, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_velocity_to_zero_sends_single_off() {
        let mut out = RingBuffer::<32>::new();
        let mut note = MidiNote::new();
        note.update(&mut out, 64, 62, 0).unwrap();
        drain(&mut out);
        note.update(&mut out, 0, 62, 0).unwrap();
        assert_eq!(drain(&mut out).as_slice(), &[0x80, 62, 0]);
        note.update(&mut out, 0, 62, 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_channel_change_moves_note() {
        let mut out = RingBuffer::<32>::new();
        let mut note = MidiNote::new();
        note.update(&mut out, 100, 48, 0).unwrap();
        drain(&mut out);
        note.update(&mut out, 100, 48, 3).unwrap();
        assert_eq!(drain(&mut out).as_slice(), &[0x80, 48, 0, 0x93, 48, 100]);
    }

    #[test]
    fn test_pressure_only_while_sounding() {
        let mut out = RingBuffer::<32>::new();
        let mut note = MidiNote::new();
        note.pressure(&mut out, 20).unwrap();
        assert!(out.is_empty());
        note.update(&mut out, 90, 50, 1).unwrap();
        drain(&mut out);
        note.pressure(&mut out, 20).unwrap();
        note.pressure(&mut out, 20).unwrap();
        assert_eq!(drain(&mut out).as_slice(), &[0xA1, 50, 20]);
    }

    #[test]
    fn test_full_sink_still_tracks_state() {
        let mut out = RingBuffer::<4>::new();
        let mut note = MidiNote::new();
        note.update(&mut out, 64, 60, 0).unwrap();
        let err = note.update(&mut out, 64, 61, 0).unwrap_err();
        assert!(matches!(err, MidiError::BufferFull { .. }));
        assert_eq!(note.pitch(), 61);
        assert!(note.is_sounding());
    }
}
