//! Stand-ins for peripherals a board does not have
//!
//! The runtime is generic over its peripherals. Boards without a display,
//! UART or card slot name these types and pass `None`.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::{Display, File, MidiUart, Storage, TransmitError};

/// No display fitted
#[derive(Debug, Default)]
pub struct NoDisplay;

impl OriginDimensions for NoDisplay {
    fn size(&self) -> Size {
        Size::zero()
    }
}

impl DrawTarget for NoDisplay {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        Ok(())
    }
}

impl Display for NoDisplay {
    type DriverError = Infallible;

    fn flush(&mut self) -> Result<(), Self::DriverError> {
        Ok(())
    }
}

/// No MIDI UART wired
#[derive(Debug, Default)]
pub struct NoUart;

impl MidiUart for NoUart {
    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn transmit(&mut self, _bytes: &[u8]) -> Result<(), TransmitError> {
        Ok(())
    }
}

/// No card slot
#[derive(Debug, Default)]
pub struct NoStorage;

/// Error returned by every [`NoStorage`] operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoMedia;

/// File handle that can never be produced
#[derive(Debug)]
pub enum NoFile {}

impl File for NoFile {
    type Error = NoMedia;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        match *self {}
    }

    fn seek(&mut self, _pos: u64) -> Result<u64, Self::Error> {
        match *self {}
    }

    fn position(&self) -> u64 {
        match *self {}
    }

    fn eof(&self) -> bool {
        match *self {}
    }
}

impl Storage for NoStorage {
    type Error = NoMedia;
    type File = NoFile;

    fn open(&mut self, _path: &str) -> Result<Self::File, Self::Error> {
        Err(NoMedia)
    }

    fn close(&mut self, file: Self::File) {
        match file {}
    }
}
