//! Monotonic time source

/// Free-running monotonic counters supplied by the board.
///
/// Both counters wrap; callers subtract with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u32;

    /// Microseconds since boot. Used for audio CPU measurement.
    fn now_us(&self) -> u32;

    /// Busy-wait for `ms` milliseconds.
    fn delay_ms(&self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u32 {
        (**self).now_us()
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
