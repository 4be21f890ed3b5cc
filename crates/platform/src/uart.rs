//! MIDI UART abstraction

/// Non-zero result code reported by the UART driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("uart transmit failed (code {code})")]
pub struct TransmitError {
    /// Driver-specific result code
    pub code: i32,
}

/// Serial port carrying MIDI at 31250 baud.
///
/// Both directions are non-blocking and polled from the main loop.
pub trait MidiUart {
    /// Next received byte, if any
    fn read_byte(&mut self) -> Option<u8>;

    /// Start transmitting `bytes`. `Ok` means the driver took all of them.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), TransmitError>;
}
