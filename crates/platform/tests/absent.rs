//! Boards without a display, UART or card slot.

#![allow(clippy::unwrap_used)]

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use platform::absent::{NoDisplay, NoMedia, NoStorage, NoUart};
use platform::{Display, MidiUart, Storage};

#[test]
fn no_storage_never_opens() {
    let mut storage = NoStorage;
    assert!(matches!(storage.open("kick.wav"), Err(NoMedia)));
}

#[test]
fn no_uart_is_silent_and_accepts_everything() {
    let mut uart = NoUart;
    assert_eq!(uart.read_byte(), None);
    assert!(uart.transmit(&[0x90, 60, 100]).is_ok());
}

#[test]
fn no_display_draws_and_flushes() {
    let mut display = NoDisplay;
    display.clear(BinaryColor::On).unwrap();
    Pixel(Point::new(3, 3), BinaryColor::On).draw(&mut display).unwrap();
    assert!(display.flush().is_ok());
    assert_eq!(display.dimensions(), Size::zero());
}
