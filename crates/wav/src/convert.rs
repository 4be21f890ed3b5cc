//! Integer PCM to normalized `f32`.

use crate::SampleFormat;

const SCALE_16: f32 = 1.0 / 32_768.0;
const SCALE_24: f32 = 1.0 / 8_388_608.0;
const SCALE_32: f32 = 1.0 / 2_147_483_648.0;

/// Convert one little-endian sample to the range `[-1.0, 1.0)`.
///
/// `bytes` must hold at least [`SampleFormat::bytes`] bytes; a short slice
/// reads as silence.
#[allow(clippy::cast_precision_loss)] // 24/32-bit samples exceed f32 mantissa; expected
pub fn to_f32(bytes: &[u8], format: SampleFormat) -> f32 {
    match (format, bytes) {
        (SampleFormat::Pcm16, &[a, b, ..]) => f32::from(i16::from_le_bytes([a, b])) * SCALE_16,
        // place the 3 bytes in the top of an i32, shift back to sign-extend
        (SampleFormat::Pcm24, &[a, b, c, ..]) => {
            (i32::from_le_bytes([0, a, b, c]) >> 8) as f32 * SCALE_24
        }
        (SampleFormat::Pcm32, &[a, b, c, d, ..]) => {
            i32::from_le_bytes([a, b, c, d]) as f32 * SCALE_32
        }
        _ => 0.0,
    }
}
