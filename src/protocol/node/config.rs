//! Runtime configuration of a [`Node`](super::Node), assembled through a
//! fluent builder that validates every field.
use embassy_time::Duration;

use crate::core::NodeId;
use crate::error::ConfigError;
use crate::protocol::transport::DEFAULT_TRANSFER_ID_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Immutable node settings, fixed at construction.
pub struct NodeConfig {
    /// Local node identifier, `None` for an anonymous node.
    pub node_id: Option<NodeId>,
    /// Transfer-ID timeout applied to every new subscription.
    pub transfer_id_timeout: Duration,
    /// Index reported to the engine for frames captured by this node
    /// (non-zero only on redundant interfaces).
    pub redundant_transport_index: u8,
}

impl NodeConfig {
    /// Start a builder with the defaults (anonymous, 2 s timeout, index 0).
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::new()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            transfer_id_timeout: DEFAULT_TRANSFER_ID_TIMEOUT,
            redundant_transport_index: 0,
        }
    }
}

//==================================================================================NODE_CONFIG_BUILDER
#[derive(Debug, Clone, Copy)]
/// Fluent builder for [`NodeConfig`].
pub struct NodeConfigBuilder {
    node_id: Option<u8>,
    transfer_id_timeout: Duration,
    redundant_transport_index: u8,
}

impl Default for NodeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeConfigBuilder {
    pub fn new() -> Self {
        Self {
            node_id: None,
            transfer_id_timeout: DEFAULT_TRANSFER_ID_TIMEOUT,
            redundant_transport_index: 0,
        }
    }

    /// Local node identifier (0..=127). Validated by [`build`](Self::build).
    pub fn node_id(mut self, node_id: u8) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Run without a node identifier.
    pub fn anonymous(mut self) -> Self {
        self.node_id = None;
        self
    }

    /// Transfer-ID timeout for new subscriptions.
    pub fn transfer_id_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_id_timeout = timeout;
        self
    }

    /// Redundant interface index handed to the engine on accept.
    pub fn redundant_transport_index(mut self, index: u8) -> Self {
        self.redundant_transport_index = index;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<NodeConfig, ConfigError> {
        let node_id = self.node_id.map(NodeId::new).transpose()?;
        if self.transfer_id_timeout.as_micros() == 0 {
            return Err(ConfigError::ZeroTransferIdTimeout);
        }
        Ok(NodeConfig {
            node_id,
            transfer_id_timeout: self.transfer_id_timeout,
            redundant_transport_index: self.redundant_transport_index,
        })
    }
}
