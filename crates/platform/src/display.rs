//! Display abstraction layer

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Monochrome display with a local framebuffer.
///
/// Drawing goes to the framebuffer through [`DrawTarget`]; [`Display::flush`]
/// pushes it to the panel. The main loop flushes once per UI tick.
pub trait Display: DrawTarget<Color = BinaryColor> {
    /// Error type for the panel transfer
    type DriverError: core::fmt::Debug;

    /// Transfer the framebuffer to the panel
    fn flush(&mut self) -> Result<(), Self::DriverError>;

    /// Get display dimensions
    fn dimensions(&self) -> Size {
        self.bounding_box().size
    }
}
