//! Control input abstraction

/// Encoder and switch state sampled once per audio block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlSample {
    /// Detents turned since the last sample (positive = clockwise)
    pub increment: i32,
    /// Switch came up during this sample
    pub released: bool,
    /// How long the switch has been held, 0 when up
    pub held_ms: u32,
}

/// Rotary encoder with push switch, plus optional knobs.
///
/// Called from the audio context; implementations must not block.
pub trait ControlInput {
    /// Debounce and sample the encoder.
    fn sample(&mut self) -> ControlSample;

    /// Read normalized (0.0..=1.0) knob values into `out`, returning how many
    /// were written. Boards without knobs keep the default.
    fn read_knobs(&mut self, out: &mut [f32]) -> usize {
        let _ = out;
        0
    }
}
