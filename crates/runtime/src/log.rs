//! Logging shims over `defmt` (hardware) and `tracing` (host).
//!
//! Arguments must be `Copy`: with neither feature enabled they are
//! evaluated into a discarded tuple so call sites stay warning-free.

macro_rules! info {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)+);
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)+);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = ($($arg)+);
    }};
}

macro_rules! warning {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)+);
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)+);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = ($($arg)+);
    }};
}

macro_rules! error {
    ($($arg:tt)+) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)+);
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)+);
        #[cfg(not(any(feature = "defmt", feature = "tracing")))]
        let _ = ($($arg)+);
    }};
}

pub(crate) use {error, info, warning};
