//! Board capability descriptor
//!
//! One value per board, built once at startup and handed to the runtime.
//! The runtime branches on these flags instead of per-board conditional
//! compilation.

/// What the running board provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Number of audio input channels
    pub audio_inputs: u8,
    /// Number of audio output channels
    pub audio_outputs: u8,
    /// Number of continuous knobs/CV inputs sampled each block
    pub knobs: u8,
    /// An OLED (or similar 1-bit) display is fitted
    pub has_display: bool,
    /// A MIDI UART is wired up
    pub has_midi_uart: bool,
    /// Removable storage (SD card) is available
    pub has_storage: bool,
}

impl Capabilities {
    /// Bare Daisy Seed: stereo I/O, nothing else.
    pub const SEED: Self = Self {
        audio_inputs: 2,
        audio_outputs: 2,
        knobs: 0,
        has_display: false,
        has_midi_uart: false,
        has_storage: false,
    };

    /// Daisy Pod: stereo I/O, two knobs, TRS MIDI.
    pub const POD: Self = Self {
        audio_inputs: 2,
        audio_outputs: 2,
        knobs: 2,
        has_display: false,
        has_midi_uart: true,
        has_storage: false,
    };

    /// Daisy Petal: stereo I/O, six knobs, SD card.
    pub const PETAL: Self = Self {
        audio_inputs: 2,
        audio_outputs: 2,
        knobs: 6,
        has_display: false,
        has_midi_uart: false,
        has_storage: true,
    };

    /// Daisy Field: stereo I/O, eight knobs, OLED, MIDI, SD card.
    pub const FIELD: Self = Self {
        audio_inputs: 2,
        audio_outputs: 2,
        knobs: 8,
        has_display: true,
        has_midi_uart: true,
        has_storage: true,
    };

    /// Daisy Patch: four channels, four CV knobs, OLED, MIDI, SD card.
    pub const PATCH: Self = Self {
        audio_inputs: 4,
        audio_outputs: 4,
        knobs: 4,
        has_display: true,
        has_midi_uart: true,
        has_storage: true,
    };

    /// Number of audio input channels as `usize`.
    pub const fn inputs(&self) -> usize {
        self.audio_inputs as usize
    }

    /// Number of audio output channels as `usize`.
    pub const fn outputs(&self) -> usize {
        self.audio_outputs as usize
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::SEED
    }
}
