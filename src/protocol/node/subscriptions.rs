//! Dispatch tables routing completed transfers to their handlers.
//!
//! Two independent maps are kept, one for message subjects and one for
//! service requests, so the same numeric port can be used by both without
//! interference. Lookup is an exact port match.
use heapless::LinearMap;

use crate::core::{PortId, TransferKind};
use crate::error::NodeError;
use crate::protocol::transport::traits::transfer_handler::{RxTransfer, TransferHandler};

type HandlerMap<'h, const N: usize> = LinearMap<PortId, &'h dyn TransferHandler, N>;

/// Port → handler maps for messages and service requests, `N` entries each.
pub struct SubscriptionTable<'h, const N: usize> {
    messages: HandlerMap<'h, N>,
    requests: HandlerMap<'h, N>,
}

impl<'h, const N: usize> Default for SubscriptionTable<'h, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, const N: usize> SubscriptionTable<'h, N> {
    pub const fn new() -> Self {
        Self {
            messages: LinearMap::new(),
            requests: LinearMap::new(),
        }
    }

    fn map(&self, kind: TransferKind) -> Option<&HandlerMap<'h, N>> {
        match kind {
            TransferKind::Message => Some(&self.messages),
            TransferKind::Request => Some(&self.requests),
            TransferKind::Response => None,
        }
    }

    fn map_mut(&mut self, kind: TransferKind) -> Option<&mut HandlerMap<'h, N>> {
        match kind {
            TransferKind::Message => Some(&mut self.messages),
            TransferKind::Request => Some(&mut self.requests),
            TransferKind::Response => None,
        }
    }

    /// Check that `(kind, port_id)` could be inserted without touching the table.
    pub fn check_insert(&self, kind: TransferKind, port_id: PortId) -> Result<(), NodeError> {
        let map = self
            .map(kind)
            .ok_or(NodeError::UnsupportedTransferKind { kind })?;
        if !kind.accepts_port(port_id) {
            return Err(NodeError::InvalidPortId { kind, port_id });
        }
        if map.len() == N && !map.contains_key(&port_id) {
            return Err(NodeError::SubscriptionTableFull { kind, port_id });
        }
        Ok(())
    }

    /// Register `handler`, replacing and returning any previous one.
    ///
    /// Port ranges are not checked here; callers validate with
    /// [`check_insert`](Self::check_insert) first.
    pub fn insert(
        &mut self,
        kind: TransferKind,
        port_id: PortId,
        handler: &'h dyn TransferHandler,
    ) -> Result<Option<&'h dyn TransferHandler>, NodeError> {
        let map = self
            .map_mut(kind)
            .ok_or(NodeError::UnsupportedTransferKind { kind })?;
        map.insert(port_id, handler)
            .map_err(|_| NodeError::SubscriptionTableFull { kind, port_id })
    }

    /// Remove the handler registered for `(kind, port_id)`.
    pub fn remove(
        &mut self,
        kind: TransferKind,
        port_id: PortId,
    ) -> Option<&'h dyn TransferHandler> {
        self.map_mut(kind)?.remove(&port_id)
    }

    /// Handler registered for `(kind, port_id)`.
    pub fn get(&self, kind: TransferKind, port_id: PortId) -> Option<&'h dyn TransferHandler> {
        self.map(kind)?.get(&port_id).copied()
    }

    /// Whether a handler is registered for `(kind, port_id)`.
    pub fn contains(&self, kind: TransferKind, port_id: PortId) -> bool {
        self.get(kind, port_id).is_some()
    }

    /// Number of handlers registered for `kind`.
    pub fn len(&self, kind: TransferKind) -> usize {
        self.map(kind).map_or(0, |map| map.len())
    }

    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.requests.is_empty()
    }

    /// Invoke the handler matching the transfer's kind and port.
    ///
    /// Returns `true` when a handler ran. Unregistered ports and response
    /// transfers are ignored.
    pub fn dispatch(&self, transfer: &RxTransfer<'_>) -> bool {
        let metadata = &transfer.metadata;
        match self.get(metadata.transfer_kind, metadata.port_id) {
            Some(handler) => {
                handler.on_transfer_received(transfer);
                true
            }
            None => false,
        }
    }
}
