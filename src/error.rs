//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (protocol engine status,
//! node configuration, subscription management, transfer submission).
use crate::core::{PortId, TransferKind};
use thiserror_no_std::Error;

//==================================================================================ENGINE_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Status reported by the protocol engine when an operation cannot complete.
pub enum EngineError {
    /// The engine rejected the arguments (bad port, missing destination, MTU mismatch…).
    #[error("Invalid argument")]
    InvalidArgument,
    /// Scratch memory or transmit queue capacity is exhausted.
    #[error("Out of memory")]
    OutOfMemory,
}

//==================================================================================CONFIG_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while building a [`NodeConfig`](crate::protocol::node::config::NodeConfig).
pub enum ConfigError {
    /// Cyphal/CAN node identifiers are limited to 0..=127.
    #[error("Invalid node id: {node_id}")]
    InvalidNodeId { node_id: u8 },
    /// A zero transfer-ID timeout would make every retransmission look new.
    #[error("Transfer-ID timeout must be non-zero")]
    ZeroTransferIdTimeout,
}

//==================================================================================NODE_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors returned by the node's subscription and submission operations.
pub enum NodeError {
    /// Port identifier outside the range allowed for its transfer kind.
    #[error("Invalid port id {port_id} for {kind:?}")]
    InvalidPortId { kind: TransferKind, port_id: PortId },
    /// Only message and service-request transfers can be subscribed to.
    #[error("Transfer kind {kind:?} cannot be subscribed")]
    UnsupportedTransferKind { kind: TransferKind },
    /// The dispatch table for this kind has no free slot left.
    #[error("Subscription table full, cannot register {kind:?} port {port_id}")]
    SubscriptionTableFull { kind: TransferKind, port_id: PortId },
    /// Error bubbled up from the protocol engine.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
