//! The `fmt ` sub-chunk.

use crate::WavError;

/// `WAVE_FORMAT_PCM`
pub const FORMAT_PCM: u16 = 1;

/// Size of the part of the fmt chunk every PCM file carries.
pub const FMT_CHUNK_LEN: usize = 16;

/// Integer PCM sample encodings the loader converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    /// Signed 16-bit little endian
    Pcm16,
    /// Signed 24-bit little endian, packed in 3 bytes
    Pcm24,
    /// Signed 32-bit little endian
    Pcm32,
}

impl SampleFormat {
    /// Bytes per sample on disk.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Pcm16 => 2,
            Self::Pcm24 => 3,
            Self::Pcm32 => 4,
        }
    }
}

/// Decoded and validated `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavFormat {
    /// `wFormatTag`, always [`FORMAT_PCM`] once validated
    pub format_tag: u16,
    /// Interleaved channels per frame, at least 1
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// `nBlockAlign`: bytes per interleaved frame
    pub bytes_per_frame: u16,
    /// Bits per sample: 16, 24 or 32
    pub bits_per_sample: u16,
    /// Sample encoding derived from `bits_per_sample`
    pub sample_format: SampleFormat,
}

fn le16(body: &[u8; FMT_CHUNK_LEN], at: usize) -> u16 {
    match body.get(at..at.saturating_add(2)) {
        Some(&[a, b]) => u16::from_le_bytes([a, b]),
        _ => 0,
    }
}

fn le32(body: &[u8; FMT_CHUNK_LEN], at: usize) -> u32 {
    match body.get(at..at.saturating_add(4)) {
        Some(&[a, b, c, d]) => u32::from_le_bytes([a, b, c, d]),
        _ => 0,
    }
}

impl WavFormat {
    /// Decode the first 16 bytes of a fmt chunk and reject anything the
    /// loader cannot convert.
    pub fn parse(body: &[u8; FMT_CHUNK_LEN]) -> Result<Self, WavError> {
        let format_tag = le16(body, 0);
        let channels = le16(body, 2);
        let sample_rate = le32(body, 4);
        let bytes_per_frame = le16(body, 12);
        let bits_per_sample = le16(body, 14);

        let sample_format = match (format_tag, bits_per_sample) {
            (FORMAT_PCM, 16) => SampleFormat::Pcm16,
            (FORMAT_PCM, 24) => SampleFormat::Pcm24,
            (FORMAT_PCM, 32) => SampleFormat::Pcm32,
            _ => {
                return Err(WavError::Unsupported {
                    format_tag,
                    bits: bits_per_sample,
                })
            }
        };
        if channels == 0 {
            return Err(WavError::BadFormat("zero channels"));
        }
        let min_frame = usize::from(channels).saturating_mul(sample_format.bytes());
        if usize::from(bytes_per_frame) < min_frame {
            return Err(WavError::BadFormat("block align too small"));
        }

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            bytes_per_frame,
            bits_per_sample,
            sample_format,
        })
    }

    /// Frames held by a data chunk of `data_len` bytes.
    pub fn frames_in(&self, data_len: u32) -> usize {
        let data_len = usize::try_from(data_len).unwrap_or(usize::MAX);
        data_len
            .checked_div(usize::from(self.bytes_per_frame))
            .unwrap_or(0)
    }
}
