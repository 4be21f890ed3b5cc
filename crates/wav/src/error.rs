//! WAV loading errors

/// Why a file could not be loaded.
///
/// A data chunk shorter than its header claims is not an error: the load
/// succeeds with fewer frames, see [`crate::LoadReport::is_truncated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WavError {
    /// Storage could not open the path
    #[error("file not found")]
    Open,
    /// RIFF/WAVE structure is missing or malformed
    #[error("bad wav: {0}")]
    BadFormat(&'static str),
    /// Well-formed, but not 16/24/32-bit integer PCM
    #[error("unsupported wav (format {format_tag}, {bits} bits)")]
    Unsupported {
        /// `wFormatTag` from the fmt chunk
        format_tag: u16,
        /// `wBitsPerSample` from the fmt chunk
        bits: u16,
    },
    /// The byte source reported an error
    #[error("read error")]
    Io,
    /// Destination has zero channels
    #[error("destination has no channels")]
    NoChannels,
}
