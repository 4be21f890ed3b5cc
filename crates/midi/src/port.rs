//! MIDI queues shared between the audio interrupt and the main loop.
//!
//! ```text
//!  UART rx ──poll (main)──▶ inbound ──read_inbound (audio)──▶ DSP
//!  DSP ──send_bytes (audio)──▶ outbound ──flush (main)──▶ UART tx
//! ```
//!
//! Each queue is a [`RingBuffer`] behind an embassy-sync blocking mutex on
//! `CriticalSectionRawMutex`: every access is one short critical section,
//! which is the only primitive that is sound between thread mode and an
//! interrupt on a single core. Activity flags and overflow counters are
//! plain atomics; a late observation only delays an indicator by one tick.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::MidiUart;

use crate::{MidiError, MidiSink, RingBuffer};

/// At most two transmit calls per flush: the run up to the end of the
/// storage, then the wrapped remainder.
const MAX_TRANSMITS_PER_FLUSH: usize = 2;

type Queue<const N: usize> = Mutex<CriticalSectionRawMutex, RefCell<RingBuffer<N>>>;

/// Inbound and outbound MIDI byte queues with activity indication.
pub struct MidiPort<const N: usize> {
    inbound: Queue<N>,
    outbound: Queue<N>,
    in_active: AtomicBool,
    out_active: AtomicBool,
    in_dropped: AtomicU32,
    out_dropped: AtomicU32,
}

impl<const N: usize> MidiPort<N> {
    /// Create empty queues. `const` so the port can live in a `static`.
    pub const fn new() -> Self {
        Self {
            inbound: Mutex::new(RefCell::new(RingBuffer::new())),
            outbound: Mutex::new(RefCell::new(RingBuffer::new())),
            in_active: AtomicBool::new(false),
            out_active: AtomicBool::new(false),
            in_dropped: AtomicU32::new(0),
            out_dropped: AtomicU32::new(0),
        }
    }

    /// Move every byte the UART has received into the inbound queue.
    ///
    /// The UART is always drained; bytes that do not fit are counted in
    /// [`Self::take_in_dropped`]. Returns the number of bytes queued.
    #[allow(clippy::arithmetic_side_effects)] // Safety: bounded by bytes read this call
    pub fn receive<U: MidiUart + ?Sized>(&self, uart: &mut U) -> usize {
        let mut queued = 0;
        while let Some(byte) = uart.read_byte() {
            self.in_active.store(true, Ordering::Relaxed);
            match self.inbound.lock(|rb| rb.borrow_mut().push(byte)) {
                Ok(()) => queued += 1,
                Err(_) => {
                    self.in_dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        queued
    }

    /// Drain queued inbound bytes into `out`. Called by the audio context
    /// before the DSP runs.
    pub fn read_inbound(&self, out: &mut [u8]) -> usize {
        self.inbound.lock(|rb| rb.borrow_mut().read_into(out))
    }

    /// Queue one outbound message as a group.
    ///
    /// # Errors
    ///
    /// [`MidiError::BufferFull`] if the whole message does not fit; nothing
    /// is queued and the drop is counted.
    pub fn send_bytes(&self, bytes: &[u8]) -> Result<(), MidiError> {
        let result = self.outbound.lock(|rb| rb.borrow_mut().write_all(bytes));
        match result {
            Ok(()) => self.out_active.store(true, Ordering::Relaxed),
            Err(_) => {
                self.out_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    /// Hand queued outbound bytes to the UART.
    ///
    /// The read index only advances past bytes the driver accepted. Returns
    /// the number of bytes transmitted.
    ///
    /// # Errors
    ///
    /// [`MidiError::Transmit`] with the driver's result code. The failed run
    /// stays queued for the next call.
    #[allow(clippy::arithmetic_side_effects)] // Safety: sent <= N
    pub fn flush<U: MidiUart + ?Sized>(&self, uart: &mut U) -> Result<usize, MidiError> {
        let mut sent = 0;
        for _ in 0..MAX_TRANSMITS_PER_FLUSH {
            let mut chunk = [0u8; N];
            let len = self.outbound.lock(|rb| {
                let rb = rb.borrow();
                let run = rb.contiguous();
                match chunk.get_mut(..run.len()) {
                    Some(dst) => {
                        dst.copy_from_slice(run);
                        run.len()
                    }
                    None => 0,
                }
            });
            let Some(run) = chunk.get(..len).filter(|run| !run.is_empty()) else {
                break;
            };
            uart.transmit(run)?;
            self.outbound.lock(|rb| rb.borrow_mut().consume(len));
            sent += len;
        }
        Ok(sent)
    }

    /// Whether any byte arrived since the last call.
    pub fn take_in_active(&self) -> bool {
        self.in_active.swap(false, Ordering::Relaxed)
    }

    /// Whether any message was queued for sending since the last call.
    pub fn take_out_active(&self) -> bool {
        self.out_active.swap(false, Ordering::Relaxed)
    }

    /// Inbound bytes dropped since the last call.
    pub fn take_in_dropped(&self) -> u32 {
        self.in_dropped.swap(0, Ordering::Relaxed)
    }

    /// Outbound messages dropped since the last call.
    pub fn take_out_dropped(&self) -> u32 {
        self.out_dropped.swap(0, Ordering::Relaxed)
    }

    /// Bytes waiting to be transmitted.
    pub fn outbound_len(&self) -> usize {
        self.outbound.lock(|rb| rb.borrow().len())
    }

    /// Bytes waiting for the audio context.
    pub fn inbound_len(&self) -> usize {
        self.inbound.lock(|rb| rb.borrow().len())
    }

    /// Empty both queues, e.g. across an app swap.
    pub fn clear(&self) {
        self.inbound.lock(|rb| rb.borrow_mut().clear());
        self.outbound.lock(|rb| rb.borrow_mut().clear());
    }
}

impl<const N: usize> Default for MidiPort<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MidiSink for &MidiPort<N> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        MidiPort::send_bytes(self, bytes)
    }
}
