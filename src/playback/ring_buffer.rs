//! Stereo ring buffer between the producer thread and the audio callback
//!
//! A fixed-capacity SPSC ring buffer of stereo frames. The producer thread
//! writes staged clip data; the audio callback reads whatever is available
//! and fills the remainder of its block with silence.
//!
//! ## Design
//!
//! ```text
//! Producer thread → write()
//!                      ↓
//!               StereoRingBuffer
//!               - fixed capacity, starts empty
//!               - fill level mirrored in an atomic
//!                      ↓
//!                   read()
//!                      ↓
//!               Audio callback
//! ```
//!
//! ## Thread Safety
//!
//! The ring buffer is split into producer and consumer halves at construction.
//! Each half lives behind its own Mutex because the ringbuf slice operations
//! require `&mut self`. The producer mutex is only ever taken by the producer
//! thread and the consumer mutex only by the audio callback (plus `clear()`
//! on the control path), so neither lock is ever contended for longer than
//! one slice copy. The fill level is mirrored in an AtomicUsize so either
//! side can observe occupancy without touching the other side's lock.
//!
//! Memory ordering: Release on write/read updates so occupancy observed by
//! the other side never overstates what has actually been copied; Acquire
//! on loads.

use crate::audio::types::StereoFrame;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Snapshot of ring buffer occupancy for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct RingBufferStats {
    /// Total capacity in frames
    pub capacity: usize,

    /// Frames currently buffered
    pub occupied: usize,
}

impl RingBufferStats {
    /// Fill level as a percentage (0.0 to 100.0)
    pub fn fill_percent(&self) -> f32 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.occupied as f32 / self.capacity as f32) * 100.0
    }
}

/// Fixed-capacity stereo frame ring buffer.
///
/// All methods take `&self`; interior mutability keeps the producer and
/// consumer halves independently lockable.
pub struct StereoRingBuffer {
    /// Producer half (producer thread writes)
    prod: Mutex<HeapProd<StereoFrame>>,

    /// Consumer half (audio callback reads)
    cons: Mutex<HeapCons<StereoFrame>>,

    /// Current fill level in frames, mirrored atomically
    occupied: AtomicUsize,

    /// Total capacity in frames (fixed at construction)
    capacity: usize,
}

impl std::fmt::Debug for StereoRingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StereoRingBuffer")
            .field("capacity", &self.capacity)
            .field("occupied", &self.occupied.load(Ordering::Relaxed))
            .finish()
    }
}

impl StereoRingBuffer {
    /// Create a new empty ring buffer with the given capacity in frames.
    pub fn new(capacity: usize) -> Self {
        debug!(
            "Creating stereo ring buffer: capacity={} frames ({:.2}s @ 44.1kHz)",
            capacity,
            capacity as f64 / 44100.0
        );

        let rb = HeapRb::<StereoFrame>::new(capacity);
        let (prod, cons) = rb.split();

        Self {
            prod: Mutex::new(prod),
            cons: Mutex::new(cons),
            occupied: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Write frames from the producer side.
    ///
    /// Copies as many frames as fit (at most two contiguous slice copies
    /// internally) and returns the number written, which may be less than
    /// `frames.len()` when the buffer is near full. Never blocks beyond the
    /// producer mutex, which only the producer thread takes.
    pub fn write(&self, frames: &[StereoFrame]) -> usize {
        let mut prod = self.prod.lock().unwrap();
        let written = prod.push_slice(frames);
        drop(prod);

        if written > 0 {
            self.occupied.fetch_add(written, Ordering::Release);
        }
        written
    }

    /// Read frames into `out` from the consumer side.
    ///
    /// Copies up to `out.len()` frames and returns the number read, which
    /// may be less (including zero) when the buffer runs dry. The caller is
    /// responsible for silence-filling the remainder of its block.
    pub fn read(&self, out: &mut [StereoFrame]) -> usize {
        let mut cons = self.cons.lock().unwrap();
        let read = cons.pop_slice(out);
        drop(cons);

        if read > 0 {
            self.occupied.fetch_sub(read, Ordering::Release);
        }
        read
    }

    /// Discard all buffered frames (hard cut).
    ///
    /// Called from the producer side when a new trigger must start from a
    /// clean slate. Drains through the consumer half so the producer half's
    /// write position stays consistent.
    pub fn clear(&self) {
        let mut cons = self.cons.lock().unwrap();
        let mut drained = 0usize;
        while cons.try_pop().is_some() {
            drained += 1;
        }
        drop(cons);

        if drained > 0 {
            self.occupied.fetch_sub(drained, Ordering::Release);
            debug!("Ring buffer cleared: {} frames discarded", drained);
        }
    }

    /// Frames currently buffered
    pub fn occupied(&self) -> usize {
        self.occupied.load(Ordering::Acquire)
    }

    /// Free space in frames
    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.occupied())
    }

    /// Total capacity in frames
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when no frames are buffered
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Occupancy snapshot for diagnostics
    pub fn stats(&self) -> RingBufferStats {
        RingBufferStats {
            capacity: self.capacity,
            occupied: self.occupied(),
        }
    }
}
