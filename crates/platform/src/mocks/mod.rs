//! Mock implementations for testing
//!
//! Host-side stand-ins for every platform trait. Each mock is a cheap
//! cloneable handle over shared state, so a test can keep one clone for
//! inspection while the runtime owns the other.

#![allow(clippy::unwrap_used)] // poisoned test mutexes should abort the test
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::{HashMap, VecDeque};
use std::string::{String, ToString};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::vec::Vec;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::*;

/// Manually advanced clock
///
/// `delay_ms` advances the counters; with [`MockClock::sleeping`] it also
/// sleeps the calling thread so a second thread can make progress.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    us: Arc<AtomicU32>,
    sleep: Arc<AtomicBool>,
}

impl MockClock {
    /// Clock starting at zero that never sleeps
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose `delay_ms` also sleeps the thread
    pub fn sleeping() -> Self {
        let clock = Self::default();
        clock.sleep.store(true, Ordering::Relaxed);
        clock
    }

    /// Advance by `ms` milliseconds
    pub fn advance_ms(&self, ms: u32) {
        self.advance_us(ms.wrapping_mul(1000));
    }

    /// Advance by `us` microseconds
    pub fn advance_us(&self, us: u32) {
        self.us.fetch_add(us, Ordering::Relaxed);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.us.load(Ordering::Relaxed) / 1000
    }

    fn now_us(&self) -> u32 {
        self.us.load(Ordering::Relaxed)
    }

    fn delay_ms(&self, ms: u32) {
        if self.sleep.load(Ordering::Relaxed) {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
        }
        self.advance_ms(ms);
    }
}

/// Scripted encoder: returns queued samples, then idle ones
#[derive(Debug, Clone, Default)]
pub struct MockControls {
    queue: Arc<Mutex<VecDeque<ControlSample>>>,
    knobs: Arc<Mutex<Vec<f32>>>,
}

impl MockControls {
    /// Create with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one sample
    pub fn push(&self, sample: ControlSample) {
        self.queue.lock().unwrap().push_back(sample);
    }

    /// Queue a rotation of `increment` detents
    pub fn turn(&self, increment: i32) {
        self.push(ControlSample {
            increment,
            ..ControlSample::default()
        });
    }

    /// Queue a held switch at `held_ms`
    pub fn hold(&self, held_ms: u32) {
        self.push(ControlSample {
            held_ms,
            ..ControlSample::default()
        });
    }

    /// Queue a switch release
    pub fn release(&self) {
        self.push(ControlSample {
            released: true,
            ..ControlSample::default()
        });
    }

    /// Samples not yet consumed
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Set the knob values returned by `read_knobs`
    pub fn set_knobs(&self, values: &[f32]) {
        *self.knobs.lock().unwrap() = values.to_vec();
    }
}

impl ControlInput for MockControls {
    fn sample(&mut self) -> ControlSample {
        self.queue.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn read_knobs(&mut self, out: &mut [f32]) -> usize {
        let knobs = self.knobs.lock().unwrap();
        let n = knobs.len().min(out.len());
        out[..n].copy_from_slice(&knobs[..n]);
        n
    }
}

#[derive(Debug, Default)]
struct UartState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    failures: VecDeque<i32>,
    transmit_calls: usize,
}

/// Loopback-free UART recording everything transmitted
#[derive(Debug, Clone, Default)]
pub struct MockUart {
    state: Arc<Mutex<UartState>>,
}

impl MockUart {
    /// Create an idle UART
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available to `read_byte`
    pub fn feed(&self, bytes: &[u8]) {
        self.state.lock().unwrap().rx.extend(bytes.iter().copied());
    }

    /// Fail the next transmit call with `code`
    pub fn fail_next(&self, code: i32) {
        self.state.lock().unwrap().failures.push_back(code);
    }

    /// Everything successfully transmitted so far
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.lock().unwrap().tx.clone()
    }

    /// Number of transmit calls, failed ones included
    pub fn transmit_calls(&self) -> usize {
        self.state.lock().unwrap().transmit_calls
    }
}

impl MidiUart for MockUart {
    fn read_byte(&mut self) -> Option<u8> {
        self.state.lock().unwrap().rx.pop_front()
    }

    fn transmit(&mut self, bytes: &[u8]) -> Result<(), TransmitError> {
        let mut state = self.state.lock().unwrap();
        state.transmit_calls += 1;
        if let Some(code) = state.failures.pop_front() {
            return Err(TransmitError { code });
        }
        state.tx.extend_from_slice(bytes);
        Ok(())
    }
}

/// Errors from [`MockStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStorageError {
    /// No file registered under the path
    NotFound,
}

#[derive(Debug, Default)]
struct StorageState {
    files: HashMap<String, Arc<[u8]>>,
    opened: usize,
    closed: usize,
}

/// In-memory card with open/close accounting
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    state: Arc<Mutex<StorageState>>,
}

impl MockStorage {
    /// Create an empty card
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` under `path`
    pub fn insert(&self, path: &str, data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), Arc::from(data));
    }

    /// Files currently open
    pub fn open_handles(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.opened - state.closed
    }

    /// Total successful opens
    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opened
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;
    type File = MockFile;

    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let mut state = self.state.lock().unwrap();
        let data = state
            .files
            .get(path)
            .cloned()
            .ok_or(MockStorageError::NotFound)?;
        state.opened += 1;
        Ok(MockFile { data, pos: 0 })
    }

    fn close(&mut self, _file: Self::File) {
        self.state.lock().unwrap().closed += 1;
    }
}

/// Handle into a [`MockStorage`] file
#[derive(Debug)]
pub struct MockFile {
    data: Arc<[u8]>,
    pos: usize,
}

impl File for MockFile {
    type Error = MockStorageError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        self.pos = (pos as usize).min(self.data.len());
        Ok(self.pos as u64)
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}

#[derive(Debug)]
struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
    flushes: usize,
}

/// 1-bit framebuffer display
#[derive(Debug, Clone)]
pub struct MockDisplay {
    fb: Arc<Mutex<Framebuffer>>,
}

impl MockDisplay {
    /// Create a blank display
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fb: Arc::new(Mutex::new(Framebuffer {
                width,
                height,
                pixels: vec![false; (width * height) as usize],
                flushes: 0,
            })),
        }
    }

    /// 128x64 OLED as fitted to the Field and Patch
    pub fn oled() -> Self {
        Self::new(128, 64)
    }

    /// Pixel state, `false` outside the panel
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        let fb = self.fb.lock().unwrap();
        if x >= fb.width || y >= fb.height {
            return false;
        }
        fb.pixels[(y * fb.width + x) as usize]
    }

    /// Number of lit pixels
    pub fn lit_pixels(&self) -> usize {
        self.fb.lock().unwrap().pixels.iter().filter(|p| **p).count()
    }

    /// Number of flushes so far
    pub fn flush_count(&self) -> usize {
        self.fb.lock().unwrap().flushes
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::oled()
    }
}

impl OriginDimensions for MockDisplay {
    fn size(&self) -> Size {
        let fb = self.fb.lock().unwrap();
        Size::new(fb.width, fb.height)
    }
}

impl DrawTarget for MockDisplay {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let mut fb = self.fb.lock().unwrap();
        let (w, h) = (fb.width, fb.height);
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < w && y < h {
                fb.pixels[(y * w + x) as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

impl Display for MockDisplay {
    type DriverError = core::convert::Infallible;

    fn flush(&mut self) -> Result<(), Self::DriverError> {
        self.fb.lock().unwrap().flushes += 1;
        Ok(())
    }
}
