//! Cyphal/CAN node orchestrator.
//!
//! The node glues the capture path, the protocol engine and the application
//! together:
//!
//! * **capture** ([`Node::on_can_frame_received`], [`FrameCapture`]): stamp
//!   and copy a raw frame into the bounded [`RxQueue`], nothing else;
//! * **cooperative processing** ([`Node::spin_some`]): drain the receive
//!   queue through the engine, dispatch completed transfers, then drain the
//!   engine's TX queue through the caller's transmit function;
//! * **submission** ([`Node::enqueue_transfer`]): stamp a deadline and let
//!   the engine fragment and queue the transfer;
//! * **subscriptions** ([`Node::subscribe`], [`Node::unsubscribe`]): keep the
//!   engine filters and the dispatch tables in step.
//!
//! # Example
//!
//! ```rust,ignore
//! static RX_QUEUE: RxQueue<CLASSIC_MTU, 32> = RxQueue::new();
//!
//! let config = NodeConfig::builder().node_id(42).build()?;
//! let mut node: Node<'_, '_, _, _, _, CLASSIC_MTU, 32, 8> =
//!     Node::new(config, engine, heap, micros, &RX_QUEUE);
//!
//! // CAN RX interrupt
//! let capture = node.capture();
//! capture.on_can_frame_received(raw_id, &raw_payload);
//!
//! // Main loop
//! node.subscribe_message(7509, 7, &heartbeat_handler)?;
//! loop {
//!     node.spin_some(|frame| can.try_transmit(frame).is_ok());
//! }
//! ```
pub mod capture;
pub mod config;
pub mod subscriptions;

use embassy_time::Duration;

use crate::{
    core::{NodeId, PortId, TransferKind, TransferMetadata},
    error::NodeError,
    protocol::transport::{
        can_frame::CanFrame,
        rx_queue::RxQueue,
        traits::{
            korri_clock::KorriClock,
            protocol_engine::{ProtocolEngine, ReceivedTransfer},
            transfer_allocator::TransferAllocator,
            transfer_handler::{RxTransfer, TransferHandler},
        },
        tx_queue::{self, TxDrainStats},
        CLASSIC_MTU, FD_MTU,
    },
};

pub use capture::FrameCapture;
pub use config::{NodeConfig, NodeConfigBuilder};
pub use subscriptions::SubscriptionTable;

//==================================================================================STATS
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outcome of one receive-queue drain.
pub struct RxDrainStats {
    /// Frames taken out of the receive queue.
    pub frames: usize,
    /// Transfers completed by the engine.
    pub transfers: usize,
    /// Completed transfers that reached a handler.
    pub dispatched: usize,
    /// Frames the engine failed to process (usually scratch memory exhaustion).
    pub accept_errors: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outcome of one [`Node::spin_some`] call.
pub struct SpinStats {
    pub rx: RxDrainStats,
    pub tx: TxDrainStats,
}

//==================================================================================NODE
/// Node bound to a bus with payload capacity `MTU`.
///
/// * `E` – protocol engine (owns the TX queue storage)
/// * `A` – scratch allocator, owned by the node and lent to the engine
/// * `C` – microsecond clock
/// * `RX_CAP` – receive queue capacity
/// * `SUBS` – dispatch table capacity, per transfer kind
///
/// `'q` bounds the receive queue, which usually lives in a `static` shared
/// with the interrupt handler. `'h` bounds the registered handlers.
pub struct Node<'q, 'h, E, A, C, const MTU: usize, const RX_CAP: usize, const SUBS: usize>
where
    E: ProtocolEngine<A, MTU>,
    A: TransferAllocator,
    C: KorriClock,
{
    engine: E,
    heap: A,
    clock: C,
    config: NodeConfig,
    rx_queue: &'q RxQueue<MTU, RX_CAP>,
    subscriptions: SubscriptionTable<'h, SUBS>,
}

/// Node on a classic CAN bus (8-byte frames).
pub type ClassicNode<'q, 'h, E, A, C, const RX_CAP: usize, const SUBS: usize> =
    Node<'q, 'h, E, A, C, CLASSIC_MTU, RX_CAP, SUBS>;

/// Node on a CAN FD bus (64-byte frames).
pub type FdNode<'q, 'h, E, A, C, const RX_CAP: usize, const SUBS: usize> =
    Node<'q, 'h, E, A, C, FD_MTU, RX_CAP, SUBS>;

impl<'q, 'h, E, A, C, const MTU: usize, const RX_CAP: usize, const SUBS: usize>
    Node<'q, 'h, E, A, C, MTU, RX_CAP, SUBS>
where
    E: ProtocolEngine<A, MTU>,
    A: TransferAllocator,
    C: KorriClock,
{
    /// Assemble a node and hand its identity to the engine.
    pub fn new(
        config: NodeConfig,
        mut engine: E,
        heap: A,
        clock: C,
        rx_queue: &'q RxQueue<MTU, RX_CAP>,
    ) -> Self {
        engine.set_node_id(config.node_id);
        Self {
            engine,
            heap,
            clock,
            config,
            rx_queue,
            subscriptions: SubscriptionTable::new(),
        }
    }

    /// Local node identifier, `None` when anonymous.
    pub fn node_id(&self) -> Option<NodeId> {
        self.config.node_id
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn rx_queue(&self) -> &'q RxQueue<MTU, RX_CAP> {
        self.rx_queue
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn heap(&self) -> &A {
        &self.heap
    }

    /// Frames waiting in the engine's TX queue.
    pub fn tx_queue_len(&self) -> usize {
        self.engine.tx_queue_len()
    }

    //==================================================================================Capture
    /// Capture entry point: timestamp the frame and queue it for
    /// [`spin_some`](Self::spin_some). Safe to call from interrupt context.
    pub fn on_can_frame_received(&self, extended_can_id: u32, payload: &[u8]) {
        capture::capture_into(self.rx_queue, &self.clock, extended_can_id, payload);
    }

    /// Capture a frame coming from an `embedded_can` driver.
    pub fn on_frame<F: embedded_can::Frame>(&self, frame: &F) {
        capture::capture_frame_into(self.rx_queue, &self.clock, frame);
    }

    /// Detached capture handle for the interrupt handler or driver task.
    pub fn capture(&self) -> FrameCapture<'q, C, MTU, RX_CAP>
    where
        C: Clone,
    {
        FrameCapture::new(self.rx_queue, self.clock.clone())
    }

    //==================================================================================Cooperative processing
    /// Cooperative entry point: drain the receive queue, then the TX queue.
    ///
    /// `transmit` must not block: it returns `true` when the driver took the
    /// frame and `false` when the hardware mailbox is full, in which case the
    /// frame is retried on the next call.
    pub fn spin_some<F>(&mut self, transmit: F) -> SpinStats
    where
        F: FnMut(&CanFrame<MTU>) -> bool,
    {
        let rx = self.process_rx_queue();
        let tx = self.process_tx_queue(transmit);
        SpinStats { rx, tx }
    }

    /// Feed every captured frame to the engine and dispatch completed transfers.
    pub fn process_rx_queue(&mut self) -> RxDrainStats {
        let mut stats = RxDrainStats::default();

        while let Some(record) = self.rx_queue.dequeue() {
            stats.frames += 1;
            let frame = record.frame();

            match self.engine.accept(
                &mut self.heap,
                record.timestamp_us,
                &frame,
                self.config.redundant_transport_index,
            ) {
                Ok(Some(transfer)) => {
                    stats.transfers += 1;
                    if self.dispatch(transfer) {
                        stats.dispatched += 1;
                    }
                }
                Ok(None) => {}
                Err(_err) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "Engine rejected frame id={:#X}: {}",
                        record.extended_can_id,
                        _err
                    );
                    stats.accept_errors += 1;
                }
            }
        }

        stats
    }

    /// Transmit queued frames, discarding the ones whose deadline passed.
    pub fn process_tx_queue<F>(&mut self, transmit: F) -> TxDrainStats
    where
        F: FnMut(&CanFrame<MTU>) -> bool,
    {
        tx_queue::drain::<MTU, _, _, _, _>(
            &mut self.engine,
            &mut self.heap,
            &self.clock,
            transmit,
        )
    }

    /// Route a completed transfer to its handler, then give its scratch
    /// memory back to the heap whether or not a handler ran.
    fn dispatch(&mut self, transfer: ReceivedTransfer<A::Block>) -> bool {
        let ReceivedTransfer {
            metadata,
            timestamp_us,
            payload_size,
            payload,
        } = transfer;

        let handled = {
            let bytes: &[u8] = match &payload {
                Some(block) => {
                    let raw: &[u8] = block.as_ref();
                    &raw[..payload_size.min(raw.len())]
                }
                None => &[],
            };
            self.subscriptions.dispatch(&RxTransfer {
                metadata,
                timestamp_us,
                payload: bytes,
            })
        };

        #[cfg(feature = "defmt")]
        if !handled {
            defmt::trace!(
                "No handler for {} on port {}",
                metadata.transfer_kind,
                metadata.port_id
            );
        }

        if let Some(block) = payload {
            self.heap.free(block);
        }

        handled
    }

    //==================================================================================Submission
    /// Queue a transfer for transmission within `timeout`.
    ///
    /// Returns the number of frames queued. Fails without queuing anything
    /// when the engine runs out of TX queue capacity or scratch memory.
    pub fn enqueue_transfer(
        &mut self,
        timeout: Duration,
        metadata: &TransferMetadata,
        payload: &[u8],
    ) -> Result<usize, NodeError> {
        let kind = metadata.transfer_kind;
        if !kind.accepts_port(metadata.port_id) {
            return Err(NodeError::InvalidPortId {
                kind,
                port_id: metadata.port_id,
            });
        }

        let tx_deadline_us = self.clock.now_us().wrapping_add(timeout.as_micros());
        let frames = self
            .engine
            .push_transfer(&mut self.heap, tx_deadline_us, metadata, payload)?;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Queued {} frame(s) for port {}, deadline {}",
            frames,
            metadata.port_id,
            tx_deadline_us
        );

        Ok(frames)
    }

    //==================================================================================Subscriptions
    /// Register `handler` for transfers of `kind` on `port_id`.
    ///
    /// `extent` is the largest payload the engine should reassemble for this
    /// port. Subscribing an already-registered port replaces its handler; the
    /// previous one is returned.
    pub fn subscribe(
        &mut self,
        kind: TransferKind,
        port_id: PortId,
        extent: usize,
        handler: &'h dyn TransferHandler,
    ) -> Result<Option<&'h dyn TransferHandler>, NodeError> {
        self.subscriptions.check_insert(kind, port_id)?;
        let timeout_us = self.config.transfer_id_timeout.as_micros();
        self.engine.subscribe(kind, port_id, extent, timeout_us)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Subscribed {} port {}", kind, port_id);

        self.subscriptions.insert(kind, port_id, handler)
    }

    /// Stop receiving transfers of `kind` on `port_id`.
    ///
    /// The engine is told first; the handler is dropped from the table only
    /// once the engine agreed. Returns whether a handler was registered.
    pub fn unsubscribe(&mut self, kind: TransferKind, port_id: PortId) -> Result<bool, NodeError> {
        if kind == TransferKind::Response {
            return Err(NodeError::UnsupportedTransferKind { kind });
        }
        self.engine.unsubscribe(kind, port_id)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Unsubscribed {} port {}", kind, port_id);

        Ok(self.subscriptions.remove(kind, port_id).is_some())
    }

    /// Subscribe to messages published on `subject_id`.
    pub fn subscribe_message(
        &mut self,
        subject_id: PortId,
        extent: usize,
        handler: &'h dyn TransferHandler,
    ) -> Result<Option<&'h dyn TransferHandler>, NodeError> {
        self.subscribe(TransferKind::Message, subject_id, extent, handler)
    }

    /// Serve requests addressed to `service_id`.
    pub fn subscribe_request(
        &mut self,
        service_id: PortId,
        extent: usize,
        handler: &'h dyn TransferHandler,
    ) -> Result<Option<&'h dyn TransferHandler>, NodeError> {
        self.subscribe(TransferKind::Request, service_id, extent, handler)
    }

    pub fn unsubscribe_message(&mut self, subject_id: PortId) -> Result<bool, NodeError> {
        self.unsubscribe(TransferKind::Message, subject_id)
    }

    pub fn unsubscribe_request(&mut self, service_id: PortId) -> Result<bool, NodeError> {
        self.unsubscribe(TransferKind::Request, service_id)
    }

    /// Whether a handler is registered for `(kind, port_id)`.
    pub fn is_subscribed(&self, kind: TransferKind, port_id: PortId) -> bool {
        self.subscriptions.contains(kind, port_id)
    }
}
