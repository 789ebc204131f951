//! Capture entry point usable from interrupt context.
//!
//! [`FrameCapture`] only borrows the receive queue and owns a copy of the
//! clock, so a CAN interrupt handler (or a driver task) can keep one while
//! the main loop holds `&mut Node` for [`Node::spin_some`](super::Node::spin_some).
use embedded_can::Id;

use crate::protocol::transport::rx_queue::{RxFrame, RxQueue};
use crate::protocol::transport::traits::korri_clock::KorriClock;

/// Timestamp-and-enqueue handle onto a node's receive queue.
///
/// Every operation is bounded, allocation-free and total: a full queue
/// silently drops the newest frame (see [`RxQueue`]).
pub struct FrameCapture<'q, C, const MTU: usize, const N: usize> {
    rx_queue: &'q RxQueue<MTU, N>,
    clock: C,
}

impl<'q, C: Clone, const MTU: usize, const N: usize> Clone for FrameCapture<'q, C, MTU, N> {
    fn clone(&self) -> Self {
        Self {
            rx_queue: self.rx_queue,
            clock: self.clock.clone(),
        }
    }
}

impl<'q, C, const MTU: usize, const N: usize> FrameCapture<'q, C, MTU, N>
where
    C: KorriClock,
{
    pub fn new(rx_queue: &'q RxQueue<MTU, N>, clock: C) -> Self {
        Self { rx_queue, clock }
    }

    /// Stamp a raw frame with the current time and queue it.
    /// Payload bytes beyond `MTU` are discarded.
    pub fn on_can_frame_received(&self, extended_can_id: u32, payload: &[u8]) {
        capture_into(self.rx_queue, &self.clock, extended_can_id, payload);
    }

    /// Queue a frame coming from an `embedded_can` driver.
    /// Standard-identifier and remote frames are not Cyphal traffic and are skipped.
    pub fn on_frame<F: embedded_can::Frame>(&self, frame: &F) {
        capture_frame_into(self.rx_queue, &self.clock, frame);
    }
}

pub(crate) fn capture_into<C: KorriClock, const MTU: usize, const N: usize>(
    rx_queue: &RxQueue<MTU, N>,
    clock: &C,
    extended_can_id: u32,
    payload: &[u8],
) {
    let record = RxFrame::capture(extended_can_id, payload, clock.now_us());
    let _accepted = rx_queue.enqueue(record);

    #[cfg(feature = "defmt")]
    if !_accepted {
        defmt::warn!("RX queue full, dropping frame id={:#X}", extended_can_id);
    }
}

pub(crate) fn capture_frame_into<C, F, const MTU: usize, const N: usize>(
    rx_queue: &RxQueue<MTU, N>,
    clock: &C,
    frame: &F,
) where
    C: KorriClock,
    F: embedded_can::Frame,
{
    if frame.is_remote_frame() {
        return;
    }
    if let Id::Extended(id) = frame.id() {
        capture_into(rx_queue, clock, id.as_raw(), frame.data());
    }
}
