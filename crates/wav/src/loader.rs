//! Chunk scanner and windowed sample reader.
//!
//! # Lifecycle
//!
//! ```text
//! open ─▶ RIFF/WAVE header ─▶ scan chunks ─▶ fmt ─▶ … ─▶ data ─▶ stream windows ─▶ close
//!                               (skip unknown chunks by seeking past them)
//! ```
//!
//! [`load`] always closes the file it opened, whatever the outcome.

use platform::{File, Storage};

use crate::convert::to_f32;
use crate::format::FMT_CHUNK_LEN;
use crate::{WavError, WavFormat};

/// Bytes read from the file per window.
pub const SCRATCH_BYTES: usize = 512;

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadReport {
    /// Frames written to the destination
    pub frames: usize,
    /// Frames that should have been written: the smaller of what the data
    /// chunk declares and what the destination holds
    pub expected_frames: usize,
    /// The file's format
    pub format: WavFormat,
}

impl LoadReport {
    /// `true` when the data chunk ended before its declared size.
    pub fn is_truncated(&self) -> bool {
        self.frames < self.expected_frames
    }
}

/// Open `path`, load it into `dest`, and close it again.
///
/// `dest` is interleaved with `dest_channels` samples per frame. Loading
/// stops when `dest` is full or the data runs out. Data that stops short of
/// its declared size is only a truncation when the file is at its end;
/// otherwise the read is reported as [`WavError::Io`].
pub fn load<S: Storage>(
    storage: &mut S,
    path: &str,
    dest: &mut [f32],
    dest_channels: usize,
) -> Result<LoadReport, WavError> {
    let mut file = storage.open(path).map_err(|_| WavError::Open)?;
    let result = read_wav(&mut file, dest, dest_channels);
    storage.close(file);
    result
}

/// Load from an already open byte source positioned at the RIFF header.
pub fn read_wav<F: File>(
    file: &mut F,
    dest: &mut [f32],
    dest_channels: usize,
) -> Result<LoadReport, WavError> {
    if dest_channels == 0 {
        return Err(WavError::NoChannels);
    }

    let mut riff = [0u8; 12];
    read_exact(file, &mut riff)?;
    if riff.get(0..4) != Some(b"RIFF".as_slice()) || riff.get(8..12) != Some(b"WAVE".as_slice()) {
        return Err(WavError::BadFormat("not a RIFF/WAVE file"));
    }

    let mut format: Option<WavFormat> = None;
    loop {
        let mut header = [0u8; 8];
        if read_exact(file, &mut header).is_err() {
            return Err(WavError::BadFormat(if format.is_some() {
                "missing data chunk"
            } else {
                "missing fmt chunk"
            }));
        }
        let [a, b, c, d, s0, s1, s2, s3] = header;
        let id = [a, b, c, d];
        let size = u32::from_le_bytes([s0, s1, s2, s3]);

        match &id {
            b"fmt " => {
                if (size as usize) < FMT_CHUNK_LEN {
                    return Err(WavError::BadFormat("short fmt chunk"));
                }
                let mut body = [0u8; FMT_CHUNK_LEN];
                read_exact(file, &mut body)?;
                format = Some(WavFormat::parse(&body)?);
                skip(file, padded(size).saturating_sub(FMT_CHUNK_LEN as u64))?;
            }
            b"data" => {
                let format = format.ok_or(WavError::BadFormat("data before fmt chunk"))?;
                return stream(file, format, size, dest, dest_channels);
            }
            _ => skip(file, padded(size))?,
        }
    }
}

/// Chunks are word aligned: odd sizes carry one pad byte.
fn padded(size: u32) -> u64 {
    u64::from(size).saturating_add(u64::from(size & 1))
}

fn skip<F: File>(file: &mut F, len: u64) -> Result<(), WavError> {
    let target = file.position().saturating_add(len);
    file.seek(target).map_err(|_| WavError::Io)?;
    Ok(())
}

/// Fill `buf` completely or fail.
fn read_exact<F: File>(file: &mut F, buf: &mut [u8]) -> Result<(), WavError> {
    if read_full(file, buf)? == buf.len() {
        Ok(())
    } else {
        Err(WavError::BadFormat("unexpected end of file"))
    }
}

/// Read until `buf` is full or the source is exhausted.
#[allow(clippy::arithmetic_side_effects)] // Safety: filled + n <= buf.len()
fn read_full<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, WavError> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..).filter(|rest| !rest.is_empty()) {
        let n = file.read(rest).map_err(|_| WavError::Io)?;
        if n == 0 {
            break;
        }
        filled += n.min(rest.len());
    }
    Ok(filled)
}

#[allow(clippy::arithmetic_side_effects)] // Safety: frame counts bounded by dest.len()
fn stream<F: File>(
    file: &mut F,
    format: WavFormat,
    data_len: u32,
    dest: &mut [f32],
    dest_channels: usize,
) -> Result<LoadReport, WavError> {
    let frame_bytes = usize::from(format.bytes_per_frame);
    let sample_bytes = format.sample_format.bytes();
    let source_channels = usize::from(format.channels);
    if frame_bytes > SCRATCH_BYTES {
        return Err(WavError::BadFormat("frame larger than scratch window"));
    }

    let expected_frames = format.frames_in(data_len).min(dest.len() / dest_channels);
    let window = (SCRATCH_BYTES / frame_bytes) * frame_bytes;
    let mut scratch = [0u8; SCRATCH_BYTES];
    let mut frames = 0;

    while frames < expected_frames {
        let want = window.min((expected_frames - frames) * frame_bytes);
        let Some(buf) = scratch.get_mut(..want) else {
            break;
        };
        let got = read_full(file, buf)?;
        let whole = buf.get(..got - got % frame_bytes).unwrap_or(&[]);

        for frame in whole.chunks_exact(frame_bytes) {
            let start = frames * dest_channels;
            let Some(out) = dest.get_mut(start..start + dest_channels) else {
                break;
            };
            for (channel, slot) in out.iter_mut().enumerate() {
                let offset = (channel % source_channels) * sample_bytes;
                *slot = frame
                    .get(offset..offset + sample_bytes)
                    .map_or(0.0, |bytes| to_f32(bytes, format.sample_format));
            }
            frames += 1;
        }

        if got < want {
            // a short read before the end of the file is a driver fault,
            // not a truncated data chunk
            if !file.eof() {
                return Err(WavError::Io);
            }
            break;
        }
    }

    Ok(LoadReport {
        frames,
        expected_frames,
        format,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use platform::mocks::MockStorage;

    use super::*;

    #[test]
    fn test_missing_file_is_open_error() {
        let mut storage = MockStorage::new();
        let mut dest = [0.0f32; 4];
        assert_eq!(load(&mut storage, "none.wav", &mut dest, 1), Err(WavError::Open));
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_zero_dest_channels_rejected_and_closed() {
        let mut storage = MockStorage::new();
        storage.insert("a.wav", b"RIFF\0\0\0\0WAVE".to_vec());
        let mut dest = [0.0f32; 4];
        assert_eq!(load(&mut storage, "a.wav", &mut dest, 0), Err(WavError::NoChannels));
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_padded_rounds_odd_sizes() {
        assert_eq!(padded(3), 4);
        assert_eq!(padded(4), 4);
    }
}
