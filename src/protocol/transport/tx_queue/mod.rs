//! Transmit-queue draining policy. Storage belongs to the protocol engine;
//! this module decides, for each queued frame, whether it is still worth
//! sending, and hands it to the caller-supplied transmit function.
//!
//! Rules applied by [`drain`]:
//! - a frame whose deadline has passed is popped and discarded without
//!   reaching the transmit function;
//! - a frame accepted by the transmit function is popped;
//! - the first frame refused by the transmit function stays at the head and
//!   draining stops, preserving CAN frame order for the next call.
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::{
    korri_clock::KorriClock, protocol_engine::ProtocolEngine,
    transfer_allocator::TransferAllocator,
};

//==================================================================================TX_QUEUE_ITEM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One outbound frame and the absolute time after which it is useless.
pub struct TxQueueItem<const MTU: usize> {
    pub frame: CanFrame<MTU>,
    /// Transmission deadline in microseconds.
    pub tx_deadline_us: u64,
}

impl<const MTU: usize> TxQueueItem<MTU> {
    /// Whether the deadline has passed at `now_us`.
    #[inline]
    pub fn is_expired(&self, now_us: u64) -> bool {
        deadline_passed(self.tx_deadline_us, now_us)
    }
}

/// Wraparound-safe "now is strictly after deadline".
///
/// The signed difference stays correct as long as deadline and current time
/// are less than 2^63 µs apart, even when the microsecond counter wraps.
#[inline]
pub const fn deadline_passed(deadline_us: u64, now_us: u64) -> bool {
    (now_us.wrapping_sub(deadline_us) as i64) > 0
}

//==================================================================================DRAIN
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outcome of one [`drain`] pass.
pub struct TxDrainStats {
    /// Frames accepted by the transmit function.
    pub sent: usize,
    /// Frames discarded because their deadline had passed.
    pub expired: usize,
    /// Whether draining stopped on a frame the transmit function refused.
    pub blocked: bool,
}

/// Walk the engine's TX queue, dropping expired frames and transmitting the
/// rest until the queue is empty or `transmit` refuses a frame.
pub fn drain<const MTU: usize, E, A, C, F>(
    engine: &mut E,
    heap: &mut A,
    clock: &C,
    mut transmit: F,
) -> TxDrainStats
where
    E: ProtocolEngine<A, MTU>,
    A: TransferAllocator,
    C: KorriClock,
    F: FnMut(&CanFrame<MTU>) -> bool,
{
    let mut stats = TxDrainStats::default();

    loop {
        let expired = match engine.peek_next_frame() {
            None => break,
            Some(item) => {
                if item.is_expired(clock.now_us()) {
                    true
                } else if transmit(&item.frame) {
                    false
                } else {
                    stats.blocked = true;
                    break;
                }
            }
        };

        // Stop if the engine peeks a frame it cannot pop.
        let Some(_item) = engine.pop_frame(heap) else {
            break;
        };
        if expired {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "TX deadline missed, dropping frame id={:#X} deadline={}",
                _item.frame.extended_can_id,
                _item.tx_deadline_us
            );
            stats.expired += 1;
        } else {
            stats.sent += 1;
        }
    }

    #[cfg(feature = "defmt")]
    if stats.blocked {
        defmt::trace!("TX blocked by driver, {} frame(s) left", engine.tx_queue_len());
    }

    stats
}
