//! Runtime error taxonomy
//!
//! Nothing here halts the device. Each error is logged, written to the
//! console, and the affected feature degrades: a failed load leaves the
//! audio path silent, a DSP fault silences one block.

use wav::WavError;

/// Why an app could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Both arena pools are too full for the request
    #[error("out of memory ({requested} bytes)")]
    AllocationExhausted {
        /// Bytes requested
        requested: usize,
    },
    /// A sample file could not be loaded
    #[error("sample load failed: {0}")]
    Wav(#[from] WavError),
    /// The board has no storage
    #[error("no storage")]
    NoStorage,
}

/// Orchestrator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RuntimeError {
    /// The app table is empty
    #[error("no apps installed")]
    NoApps,
    /// Load requested for an index past the app table
    #[error("no app at index {index}")]
    UnknownApp {
        /// Requested index
        index: usize,
    },
    /// The audio context did not acknowledge the park request in time
    #[error("audio did not park within {timeout_ms} ms")]
    AudioStalled {
        /// Bound that elapsed
        timeout_ms: u32,
    },
    /// The app's load function failed
    #[error("app load failed: {0}")]
    Load(#[from] LoadError),
    /// A second audio engine or main loop was created on the same context
    #[error("context half already claimed")]
    AlreadyClaimed,
}
