//! Bounded receive queue bridging the capture context (CAN interrupt or
//! driver callback) and the cooperative processing loop.
//!
//! The queue is a fixed-capacity FIFO of [`RxFrame`] records. Every mutation
//! runs inside a critical section acquired through
//! [`embassy_sync::blocking_mutex::Mutex`], released on every exit path when
//! the closure returns. No allocation happens at call time.
//!
//! # Overflow policy
//!
//! When the queue is full the **newest** frame is dropped: frames already
//! queued keep their relative order and the drop is counted
//! ([`RxQueue::dropped_frames`]). Capture never fails observably.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use heapless::Deque;

use crate::protocol::transport::can_frame::CanFrame;

//==================================================================================RX_FRAME
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One captured CAN frame together with its reception timestamp.
pub struct RxFrame<const MTU: usize> {
    /// 29-bit CAN identifier.
    pub extended_can_id: u32,
    /// Payload copy, truncated to `MTU`.
    pub payload: [u8; MTU],
    /// Number of valid bytes in `payload`.
    pub payload_size: usize,
    /// Capture time in microseconds.
    pub timestamp_us: u64,
}

impl<const MTU: usize> RxFrame<MTU> {
    /// Copy a raw frame, keeping at most `MTU` payload bytes.
    pub fn capture(extended_can_id: u32, payload: &[u8], timestamp_us: u64) -> Self {
        let frame = CanFrame::<MTU>::truncated(extended_can_id, payload);
        Self {
            extended_can_id: frame.extended_can_id,
            payload: frame.data,
            payload_size: frame.len,
            timestamp_us,
        }
    }

    /// Frame view handed to the protocol engine.
    pub fn frame(&self) -> CanFrame<MTU> {
        CanFrame {
            extended_can_id: self.extended_can_id,
            data: self.payload,
            len: self.payload_size,
        }
    }
}

//==================================================================================RX_QUEUE
/// State protected by the critical section.
struct RxRing<const MTU: usize, const N: usize> {
    frames: Deque<RxFrame<MTU>, N>,
    dropped: u32,
}

/// Fixed-capacity, interrupt-safe FIFO of captured frames.
///
/// `MTU` sizes the payload (8 classic, 64 FD), `N` is the capacity.
/// `new` is `const`, so the queue can live in a `static` shared by the
/// interrupt handler and the main loop.
pub struct RxQueue<const MTU: usize, const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<RxRing<MTU, N>>>,
}

impl<const MTU: usize, const N: usize> Default for RxQueue<MTU, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MTU: usize, const N: usize> RxQueue<MTU, N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RxRing {
                frames: Deque::new(),
                dropped: 0,
            })),
        }
    }

    /// Append a frame. Returns `false` (and counts the drop) when full.
    pub fn enqueue(&self, frame: RxFrame<MTU>) -> bool {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            match ring.frames.push_back(frame) {
                Ok(()) => true,
                Err(_) => {
                    ring.dropped = ring.dropped.wrapping_add(1);
                    false
                }
            }
        })
    }

    /// Remove the oldest frame, `None` when empty.
    pub fn dequeue(&self) -> Option<RxFrame<MTU>> {
        self.inner.lock(|ring| ring.borrow_mut().frames.pop_front())
    }

    /// Whether no frame is waiting.
    pub fn is_empty(&self) -> bool {
        self.inner.lock(|ring| ring.borrow().frames.is_empty())
    }

    /// Number of frames waiting.
    pub fn len(&self) -> usize {
        self.inner.lock(|ring| ring.borrow().frames.len())
    }

    /// Maximum number of frames the queue can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Frames rejected because the queue was full (wrapping counter).
    pub fn dropped_frames(&self) -> u32 {
        self.inner.lock(|ring| ring.borrow().dropped)
    }

    /// Discard every pending frame. The drop counter is kept.
    pub fn clear(&self) {
        self.inner.lock(|ring| ring.borrow_mut().frames.clear())
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
