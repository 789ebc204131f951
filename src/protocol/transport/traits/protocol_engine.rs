//! Contract with the Cyphal/CAN transfer-layer engine (reassembly, CRC,
//! transfer-ID tracking, CAN-ID codec, TX queue storage). The node only
//! orchestrates; every protocol decision is delegated through this trait.
use crate::core::{NodeId, PortId, TransferKind, TransferMetadata};
use crate::error::EngineError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::transfer_allocator::TransferAllocator;
use crate::protocol::transport::tx_queue::TxQueueItem;

/// Transfer completed by [`ProtocolEngine::accept`]. The payload block
/// belongs to the allocator passed to `accept` and must be returned to it.
#[derive(Debug)]
pub struct ReceivedTransfer<B> {
    pub metadata: TransferMetadata,
    /// Timestamp of the first frame of the transfer (microseconds).
    pub timestamp_us: u64,
    /// Number of meaningful bytes at the start of `payload`.
    pub payload_size: usize,
    /// Scratch block holding the payload; `None` for empty transfers.
    pub payload: Option<B>,
}

/// Transfer-layer protocol engine for a bus with payload capacity `MTU`,
/// drawing its scratch memory from allocators of type `A`.
///
/// Every method touching scratch memory receives the node's allocator as an
/// explicit capability; engines never reach a global heap. Blocks obtained
/// from `heap` may be kept (e.g. TX frames) and are freed through the `heap`
/// passed to a later call.
pub trait ProtocolEngine<A: TransferAllocator, const MTU: usize> {
    /// Set the local node identifier (`None` = anonymous).
    fn set_node_id(&mut self, node_id: Option<NodeId>);

    /// Feed one received frame.
    ///
    /// Returns `Ok(Some(_))` when the frame completes a transfer on a
    /// subscribed port, `Ok(None)` when the frame was consumed without
    /// completing anything (partial transfer, duplicate, unsubscribed port).
    fn accept(
        &mut self,
        heap: &mut A,
        timestamp_us: u64,
        frame: &CanFrame<MTU>,
        redundant_transport_index: u8,
    ) -> Result<Option<ReceivedTransfer<A::Block>>, EngineError>;

    /// Fragment `payload` into frames and append them to the TX queue with
    /// the absolute deadline `tx_deadline_us`. Either every frame of the
    /// transfer is queued or none is. Returns the number of frames queued.
    fn push_transfer(
        &mut self,
        heap: &mut A,
        tx_deadline_us: u64,
        metadata: &TransferMetadata,
        payload: &[u8],
    ) -> Result<usize, EngineError>;

    /// Head of the TX queue (next frame to transmit).
    fn peek_next_frame(&self) -> Option<&TxQueueItem<MTU>>;

    /// Remove the head of the TX queue, releasing its storage to `heap`.
    fn pop_frame(&mut self, heap: &mut A) -> Option<TxQueueItem<MTU>>;

    /// Number of frames waiting in the TX queue.
    fn tx_queue_len(&self) -> usize;

    /// Start delivering transfers of `kind` on `port_id`.
    ///
    /// Returns `Ok(true)` for a new subscription, `Ok(false)` when an existing
    /// one was replaced.
    fn subscribe(
        &mut self,
        kind: TransferKind,
        port_id: PortId,
        extent: usize,
        transfer_id_timeout_us: u64,
    ) -> Result<bool, EngineError>;

    /// Stop delivering transfers of `kind` on `port_id`.
    ///
    /// Returns `Ok(true)` if a subscription existed.
    fn unsubscribe(&mut self, kind: TransferKind, port_id: PortId) -> Result<bool, EngineError>;
}
