//! Core data types shared by the node, the transport plumbing and the
//! protocol engine contract: node identity, port identifiers, priorities and
//! transfer metadata.
use crate::error::ConfigError;

/// Numeric identifier of a subject (messages) or service (requests/responses).
pub type PortId = u16;

/// Transfer-ID counter value. The engine applies the transport modulo (32 on CAN).
pub type TransferId = u8;

/// Highest subject identifier allowed on Cyphal/CAN.
pub const MAX_SUBJECT_ID: PortId = 8191;

/// Highest service identifier allowed on Cyphal/CAN.
pub const MAX_SERVICE_ID: PortId = 511;

/// Highest node identifier allowed on Cyphal/CAN.
pub const MAX_NODE_ID: u8 = 127;

//==================================================================================NODE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Validated Cyphal/CAN node identifier (0..=127).
pub struct NodeId(u8);

impl NodeId {
    /// Validate and wrap a raw node identifier.
    pub const fn new(raw: u8) -> Result<Self, ConfigError> {
        if raw > MAX_NODE_ID {
            return Err(ConfigError::InvalidNodeId { node_id: raw });
        }
        Ok(Self(raw))
    }

    /// Raw identifier value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for NodeId {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

//==================================================================================TRANSFER_KIND
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Kind of a Cyphal transfer.
pub enum TransferKind {
    /// Broadcast publication on a subject.
    Message,
    /// Service call addressed to a server node.
    Request,
    /// Service reply addressed to the requesting client.
    Response,
}

impl TransferKind {
    /// Highest port identifier accepted for this kind.
    pub const fn max_port_id(self) -> PortId {
        match self {
            TransferKind::Message => MAX_SUBJECT_ID,
            TransferKind::Request | TransferKind::Response => MAX_SERVICE_ID,
        }
    }

    /// Whether `port_id` is in range for this kind.
    #[inline]
    pub const fn accepts_port(self, port_id: PortId) -> bool {
        port_id <= self.max_port_id()
    }
}

//==================================================================================PRIORITY
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// The eight Cyphal transfer priority levels, highest first.
pub enum Priority {
    Exceptional = 0,
    Immediate = 1,
    Fast = 2,
    High = 3,
    #[default]
    Nominal = 4,
    Low = 5,
    Slow = 6,
    Optional = 7,
}

impl Priority {
    /// Decode the 3-bit priority field (extra bits are masked off).
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Priority::Exceptional,
            1 => Priority::Immediate,
            2 => Priority::Fast,
            3 => Priority::High,
            4 => Priority::Nominal,
            5 => Priority::Low,
            6 => Priority::Slow,
            _ => Priority::Optional,
        }
    }
}

//==================================================================================TRANSFER_METADATA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Metadata identifying one transfer, inbound or outbound.
pub struct TransferMetadata {
    /// Arbitration priority.
    pub priority: Priority,
    /// Message, request or response.
    pub transfer_kind: TransferKind,
    /// Subject or service identifier.
    pub port_id: PortId,
    /// Source node on reception, destination node on service transmission.
    /// `None` for broadcast messages or anonymous sources.
    pub remote_node_id: Option<NodeId>,
    /// Transfer-ID counter value.
    pub transfer_id: TransferId,
}

impl TransferMetadata {
    /// Metadata for a broadcast message on `subject_id`.
    pub const fn message(subject_id: PortId, transfer_id: TransferId) -> Self {
        Self {
            priority: Priority::Nominal,
            transfer_kind: TransferKind::Message,
            port_id: subject_id,
            remote_node_id: None,
            transfer_id,
        }
    }

    /// Metadata for a service request sent to `server`.
    pub const fn request(service_id: PortId, server: NodeId, transfer_id: TransferId) -> Self {
        Self {
            priority: Priority::Nominal,
            transfer_kind: TransferKind::Request,
            port_id: service_id,
            remote_node_id: Some(server),
            transfer_id,
        }
    }

    /// Override the priority.
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}
