/// Test doubles standing in for the node's collaborators: a scripted protocol
/// engine, a counting scratch allocator, a settable clock and a recording
/// transfer handler.
use korri_cyphal::{
    core::{NodeId, PortId, TransferKind, TransferMetadata},
    error::EngineError,
    protocol::transport::{
        can_frame::CanFrame,
        traits::{
            korri_clock::KorriClock,
            protocol_engine::{ProtocolEngine, ReceivedTransfer},
            transfer_allocator::TransferAllocator,
            transfer_handler::{RxTransfer, TransferHandler},
        },
        tx_queue::TxQueueItem,
    },
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

//==================================================================================CLOCK
#[derive(Clone, Default)]
#[allow(dead_code)]
/// Microsecond clock driven by the test, shareable across threads.
pub struct TestClock(Arc<AtomicU64>);

#[allow(dead_code)]
impl TestClock {
    pub fn starting_at(now_us: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now_us)))
    }

    pub fn set(&self, now_us: u64) {
        self.0.store(now_us, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_us: u64) {
        self.0.fetch_add(delta_us, Ordering::SeqCst);
    }
}

impl KorriClock for TestClock {
    fn now_us(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

//==================================================================================HEAP
#[derive(Debug)]
#[allow(dead_code)]
/// Byte-budgeted allocator keeping track of every allocation and release.
pub struct CountingHeap {
    pub capacity: usize,
    pub used: usize,
    pub allocations: usize,
    pub frees: usize,
}

#[allow(dead_code)]
impl CountingHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            used: 0,
            allocations: 0,
            frees: 0,
        }
    }

    /// Blocks handed out and not returned yet.
    pub fn outstanding(&self) -> usize {
        self.allocations - self.frees
    }
}

impl TransferAllocator for CountingHeap {
    type Block = Vec<u8>;

    fn allocate(&mut self, size: usize) -> Option<Self::Block> {
        if self.used + size > self.capacity {
            return None;
        }
        self.used += size;
        self.allocations += 1;
        Some(vec![0; size])
    }

    fn free(&mut self, block: Self::Block) {
        self.used -= block.len();
        self.frees += 1;
    }
}

//==================================================================================ENGINE
/// Identifier layout understood by [`MockEngine`]:
/// bits 0..13 port, bits 16..17 kind, bits 20..26 source node.
#[allow(dead_code)]
pub fn mock_can_id(kind: TransferKind, port_id: PortId, source: u8) -> u32 {
    let kind_bits = match kind {
        TransferKind::Message => 0u32,
        TransferKind::Request => 1,
        TransferKind::Response => 2,
    };
    (u32::from(source & 0x7F) << 20) | (kind_bits << 16) | u32::from(port_id & 0x1FFF)
}

fn decode_kind(extended_can_id: u32) -> TransferKind {
    match (extended_can_id >> 16) & 0x03 {
        0 => TransferKind::Message,
        1 => TransferKind::Request,
        _ => TransferKind::Response,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
/// Subscription request recorded by the mock engine.
pub struct EngineSubscription {
    pub kind: TransferKind,
    pub port_id: PortId,
    pub extent: usize,
    pub transfer_id_timeout_us: u64,
}

/// Single-frame protocol engine: every non-empty frame is a complete
/// transfer, empty frames are treated as fragments of an unfinished one.
/// Outbound transfers are split into `MTU`-sized frames, each backed by a
/// heap block, in a queue limited to `tx_capacity` frames.
#[allow(dead_code)]
pub struct MockEngine<const MTU: usize> {
    pub node_id: Option<NodeId>,
    pub subscriptions: Vec<EngineSubscription>,
    pub tx_capacity: usize,
    pub fail_next_accept: Option<EngineError>,
    pub fail_unsubscribe: bool,
    pub accepted_frames: Vec<(u64, CanFrame<MTU>)>,
    tx: VecDeque<(TxQueueItem<MTU>, Vec<u8>)>,
    next_rx_transfer_id: u8,
}

#[allow(dead_code)]
impl<const MTU: usize> MockEngine<MTU> {
    pub fn new(tx_capacity: usize) -> Self {
        Self {
            node_id: None,
            subscriptions: Vec::new(),
            tx_capacity,
            fail_next_accept: None,
            fail_unsubscribe: false,
            accepted_frames: Vec::new(),
            tx: VecDeque::new(),
            next_rx_transfer_id: 0,
        }
    }

    /// Deadlines of the queued frames, head first.
    pub fn tx_deadlines(&self) -> Vec<u64> {
        self.tx.iter().map(|(item, _)| item.tx_deadline_us).collect()
    }

    pub fn is_subscribed(&self, kind: TransferKind, port_id: PortId) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.kind == kind && s.port_id == port_id)
    }
}

impl<const MTU: usize> ProtocolEngine<CountingHeap, MTU> for MockEngine<MTU> {
    fn set_node_id(&mut self, node_id: Option<NodeId>) {
        self.node_id = node_id;
    }

    fn accept(
        &mut self,
        heap: &mut CountingHeap,
        timestamp_us: u64,
        frame: &CanFrame<MTU>,
        _redundant_transport_index: u8,
    ) -> Result<Option<ReceivedTransfer<Vec<u8>>>, EngineError> {
        self.accepted_frames.push((timestamp_us, *frame));
        if let Some(err) = self.fail_next_accept.take() {
            return Err(err);
        }
        if frame.len == 0 {
            return Ok(None);
        }

        let mut block = heap.allocate(frame.len).ok_or(EngineError::OutOfMemory)?;
        block.copy_from_slice(frame.payload());

        let source = ((frame.extended_can_id >> 20) & 0x7F) as u8;
        let transfer_id = self.next_rx_transfer_id;
        self.next_rx_transfer_id = self.next_rx_transfer_id.wrapping_add(1) & 0x1F;

        Ok(Some(ReceivedTransfer {
            metadata: TransferMetadata {
                priority: Default::default(),
                transfer_kind: decode_kind(frame.extended_can_id),
                port_id: (frame.extended_can_id & 0x1FFF) as PortId,
                remote_node_id: NodeId::new(source).ok(),
                transfer_id,
            },
            timestamp_us,
            payload_size: frame.len,
            payload: Some(block),
        }))
    }

    fn push_transfer(
        &mut self,
        heap: &mut CountingHeap,
        tx_deadline_us: u64,
        metadata: &TransferMetadata,
        payload: &[u8],
    ) -> Result<usize, EngineError> {
        if metadata.transfer_kind != TransferKind::Message && metadata.remote_node_id.is_none() {
            return Err(EngineError::InvalidArgument);
        }

        let frame_count = payload.len().div_ceil(MTU).max(1);
        if self.tx.len() + frame_count > self.tx_capacity {
            return Err(EngineError::OutOfMemory);
        }

        let source = self.node_id.map_or(0, NodeId::get);
        let id = mock_can_id(metadata.transfer_kind, metadata.port_id, source);

        let mut staged = Vec::with_capacity(frame_count);
        for index in 0..frame_count {
            let Some(block) = heap.allocate(MTU) else {
                for (_, block) in staged {
                    heap.free(block);
                }
                return Err(EngineError::OutOfMemory);
            };
            let start = (index * MTU).min(payload.len());
            let end = (start + MTU).min(payload.len());
            let item = TxQueueItem {
                frame: CanFrame::truncated(id, &payload[start..end]),
                tx_deadline_us,
            };
            staged.push((item, block));
        }

        self.tx.extend(staged);
        Ok(frame_count)
    }

    fn peek_next_frame(&self) -> Option<&TxQueueItem<MTU>> {
        self.tx.front().map(|(item, _)| item)
    }

    fn pop_frame(&mut self, heap: &mut CountingHeap) -> Option<TxQueueItem<MTU>> {
        let (item, block) = self.tx.pop_front()?;
        heap.free(block);
        Some(item)
    }

    fn tx_queue_len(&self) -> usize {
        self.tx.len()
    }

    fn subscribe(
        &mut self,
        kind: TransferKind,
        port_id: PortId,
        extent: usize,
        transfer_id_timeout_us: u64,
    ) -> Result<bool, EngineError> {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !(s.kind == kind && s.port_id == port_id));
        let existed = self.subscriptions.len() != before;
        self.subscriptions.push(EngineSubscription {
            kind,
            port_id,
            extent,
            transfer_id_timeout_us,
        });
        Ok(!existed)
    }

    fn unsubscribe(&mut self, kind: TransferKind, port_id: PortId) -> Result<bool, EngineError> {
        if self.fail_unsubscribe {
            return Err(EngineError::InvalidArgument);
        }
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !(s.kind == kind && s.port_id == port_id));
        Ok(self.subscriptions.len() != before)
    }
}

//==================================================================================HANDLER
#[derive(Default)]
#[allow(dead_code)]
/// Handler storing every transfer it receives.
pub struct RecordingHandler {
    pub received: RefCell<Vec<(TransferMetadata, Vec<u8>)>>,
}

#[allow(dead_code)]
impl RecordingHandler {
    pub fn count(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.received
            .borrow()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

impl TransferHandler for RecordingHandler {
    fn on_transfer_received(&self, transfer: &RxTransfer<'_>) {
        self.received
            .borrow_mut()
            .push((transfer.metadata, transfer.payload.to_vec()));
    }
}
