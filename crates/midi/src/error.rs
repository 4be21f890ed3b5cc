//! MIDI transport errors

use platform::TransmitError;

/// Failure moving MIDI bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiError {
    /// The queue cannot take the whole message; nothing was written
    #[error("midi buffer full ({needed} bytes needed, {free} free)")]
    BufferFull {
        /// Bytes in the rejected message
        needed: usize,
        /// Free slots at the time of the attempt
        free: usize,
    },
    /// The UART driver refused the transfer; the queue is untouched
    #[error("midi transmit failed (code {code})")]
    Transmit {
        /// Driver result code
        code: i32,
    },
}

impl From<TransmitError> for MidiError {
    fn from(err: TransmitError) -> Self {
        Self::Transmit { code: err.code }
    }
}
