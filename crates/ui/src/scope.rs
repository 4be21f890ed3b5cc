//! Oscilloscope trace: min/max decimation of audio blocks into pixel columns.
//!
//! The audio context folds each window of `zoom.samples()` frames into one
//! `(min, max)` pair per channel and appends it at a circular cursor. The
//! main loop reads columns at UI rate without locking.
//!
//! Each pair is two `AtomicU32`s holding `f32` bits. The writer stores min,
//! then max, then publishes the cursor with `Release`. A reader racing the
//! writer may see one column mixing two windows; that costs a one-frame
//! glitch on screen and nothing else.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Window length in samples for zoom levels 1..=9.
pub const ZOOM_SAMPLES: [usize; 9] = [1, 2, 3, 4, 6, 8, 12, 16, 24];

/// Window length for a zoom ordinal, clamped into 1..=9.
pub fn zoom_samples(level: u8) -> usize {
    let index = usize::from(level.clamp(Zoom::MIN, Zoom::MAX).saturating_sub(1));
    ZOOM_SAMPLES.get(index).copied().unwrap_or(1)
}

/// Zoom ordinal, 1..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom(u8);

impl Zoom {
    /// Smallest ordinal.
    pub const MIN: u8 = 1;
    /// Largest ordinal.
    pub const MAX: u8 = 9;
    /// Six samples per column.
    pub const DEFAULT: Self = Self(5);

    /// Validated constructor.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// The ordinal.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Samples folded into one column.
    pub fn samples(self) -> usize {
        zoom_samples(self.0)
    }

    /// Move by `delta` ordinals, wrapping at both ends.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: result in 1..=9
    pub fn step(self, delta: i32) -> Self {
        let span = i32::from(Self::MAX - Self::MIN) + 1;
        let at = i32::from(self.0 - Self::MIN);
        Self(at.wrapping_add(delta).rem_euclid(span) as u8 + Self::MIN)
    }

    /// Time covered by `width` columns, rounded up to whole milliseconds.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )] // Safety: small positive values
    pub fn duration_ms(self, width: usize, sample_rate: f32) -> u32 {
        if sample_rate <= 0.0 {
            return 0;
        }
        let ms = (width.saturating_mul(self.samples()) as f32) * 1000.0 / sample_rate;
        let whole = ms as u32;
        if (whole as f32) < ms {
            whole.saturating_add(1)
        } else {
            whole
        }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How traced channels are laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeStyle {
    /// All channels drawn over the full height
    #[default]
    Overlay,
    /// One horizontal band per channel
    Split,
    /// First channel only
    Mono,
}

impl ScopeStyle {
    const ALL: [Self; 3] = [Self::Overlay, Self::Split, Self::Mono];

    /// Cycle by `delta`, wrapping.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)] // Safety: 3 entries
    pub fn step(self, delta: i32) -> Self {
        let at = Self::ALL.iter().position(|s| *s == self).unwrap_or(0) as i32;
        let next = at.wrapping_add(delta).rem_euclid(3) as usize;
        Self::ALL.get(next).copied().unwrap_or(self)
    }
}

/// Which buffers the audio context traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeSource {
    /// DSP outputs
    #[default]
    Outputs,
    /// Codec inputs
    Inputs,
}

impl ScopeSource {
    /// Toggle on odd `delta`; stays on outputs when the board has no inputs.
    pub fn step(self, delta: i32, inputs_available: bool) -> Self {
        if !inputs_available {
            return Self::Outputs;
        }
        if delta % 2 == 0 {
            return self;
        }
        match self {
            Self::Outputs => Self::Inputs,
            Self::Inputs => Self::Outputs,
        }
    }

    /// Compact encoding for an atomic.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Outputs => 0,
            Self::Inputs => 1,
        }
    }

    /// Inverse of [`Self::to_u8`]; unknown values read as outputs.
    pub fn from_u8(raw: u8) -> Self {
        if raw == 1 {
            Self::Inputs
        } else {
            Self::Outputs
        }
    }
}

/// User-facing scope options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeSettings {
    /// Layout
    pub style: ScopeStyle,
    /// Traced buffers
    pub source: ScopeSource,
    /// Samples per column
    pub zoom: Zoom,
}

/// Circular `(min, max)` trace, `W` columns for each of `CH` channels.
pub struct ScopeTrace<const W: usize, const CH: usize> {
    /// Per channel and column: `[min, max]` as `f32` bits
    cells: [[[AtomicU32; 2]; W]; CH],
    /// Next column to write
    cursor: AtomicUsize,
}

impl<const W: usize, const CH: usize> ScopeTrace<W, CH> {
    /// Flat trace at zero.
    pub const fn new() -> Self {
        Self {
            cells: [const { [const { [const { AtomicU32::new(0) }; 2] }; W] }; CH],
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        W
    }

    /// Fold `channels` into columns, `zoom.samples()` frames per column.
    ///
    /// Frames are taken from the shortest channel; trailing frames that do
    /// not fill a window are dropped. Channels past `CH` are ignored.
    /// Returns the number of columns written. Audio context only.
    #[allow(clippy::arithmetic_side_effects)] // Safety: cursor wraps via % W
    pub fn store(&self, channels: &[&[f32]], zoom: Zoom) -> usize {
        let window = zoom.samples();
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        let windows = frames / window;
        if W == 0 {
            return 0;
        }

        let mut cursor = self.cursor.load(Ordering::Relaxed) % W;
        for w in 0..windows {
            let span = w * window..(w + 1) * window;
            for (samples, column) in channels.iter().zip(self.cells.iter()) {
                let Some(samples) = samples.get(span.clone()) else {
                    continue;
                };
                let (lo, hi) = samples
                    .iter()
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                        (lo.min(s), hi.max(s))
                    });
                if let Some([min, max]) = column.get(cursor) {
                    min.store(lo.to_bits(), Ordering::Relaxed);
                    max.store(hi.to_bits(), Ordering::Relaxed);
                }
            }
            cursor = (cursor + 1) % W;
            self.cursor.store(cursor, Ordering::Release);
        }
        windows
    }

    /// `(min, max)` of one column. Out-of-range reads as `(0, 0)`.
    pub fn column(&self, channel: usize, x: usize) -> (f32, f32) {
        self.cells
            .get(channel)
            .and_then(|c| c.get(x))
            .map_or((0.0, 0.0), |[min, max]| {
                (
                    f32::from_bits(min.load(Ordering::Relaxed)),
                    f32::from_bits(max.load(Ordering::Relaxed)),
                )
            })
    }

    /// Column the next window will be written to.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Reset to a flat trace. Only while the audio context is not storing.
    pub fn clear(&self) {
        for column in self.cells.iter().flatten() {
            for cell in column {
                cell.store(0, Ordering::Relaxed);
            }
        }
        self.cursor.store(0, Ordering::Release);
    }
}

impl<const W: usize, const CH: usize> Default for ScopeTrace<W, CH> {
    fn default() -> Self {
        Self::new()
    }
}
