//! Callback invoked by the node for every completed transfer whose port has
//! been subscribed to.
use crate::core::TransferMetadata;

/// Borrowed view over a completed transfer. The payload lives in allocator
/// scratch memory that is released as soon as the handler returns.
#[derive(Debug, Clone, Copy)]
pub struct RxTransfer<'p> {
    /// Kind, port, source and transfer-ID of the transfer.
    pub metadata: TransferMetadata,
    /// Reception timestamp of the first frame (microseconds).
    pub timestamp_us: u64,
    /// Reassembled payload.
    pub payload: &'p [u8],
}

/// Receiver of completed transfers.
///
/// Handlers run synchronously inside
/// [`Node::spin_some`](crate::protocol::node::Node::spin_some) and only get a
/// shared reference; state they update must use interior mutability.
pub trait TransferHandler {
    fn on_transfer_received(&self, transfer: &RxTransfer<'_>);
}

impl<F> TransferHandler for F
where
    F: Fn(&RxTransfer<'_>),
{
    fn on_transfer_received(&self, transfer: &RxTransfer<'_>) {
        self(transfer)
    }
}
