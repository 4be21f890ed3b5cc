//! Runtime configuration and constants
//!
//! Central values used across the workspace. Board bring-up code overrides
//! the [`RuntimeConfig`] fields; everything else reads the constants.

/// The runtime name
pub const APP_NAME: &str = "patchbox";

/// Runtime version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frames per audio block.
pub const BLOCK_SIZE: usize = 48;

/// Default codec sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// Slots in each MIDI ring buffer (one is always kept free).
pub const MIDI_BUFFER_SIZE: usize = 64;

/// Hold time after which rotation selects the mode instead.
pub const LONG_PRESS_MS: u32 = 250;

/// Hold time after which the running app is reloaded.
pub const SUPER_LONG_PRESS_MS: u32 = 2000;

/// UI tick period (state machine + display refresh).
pub const DISPLAY_PERIOD_MS: u32 = 20;

/// Upper bound on the audio park handshake before giving up.
pub const PARK_TIMEOUT_MS: u32 = 100;

/// Usable size of the fast (internal SRAM) arena pool.
pub const FAST_POOL_SIZE: usize = 512 * 1024;

/// Usable size of the bulk (external SDRAM) arena pool.
pub const BULK_POOL_SIZE: usize = 64 * 1024 * 1024;

/// Runtime tuning chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuntimeConfig {
    /// Hold threshold for entering mode selection
    pub long_press_ms: u32,
    /// Hold threshold for reloading the current app
    pub super_long_press_ms: u32,
    /// UI tick period
    pub display_period_ms: u32,
    /// Park handshake bound
    pub park_timeout_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            super_long_press_ms: SUPER_LONG_PRESS_MS,
            display_period_ms: DISPLAY_PERIOD_MS,
            park_timeout_ms: PARK_TIMEOUT_MS,
        }
    }
}
