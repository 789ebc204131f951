//! High-level components of the Cyphal/CAN node layer: transport plumbing
//! (frames, queues, collaborator traits) and the node orchestrator.
pub mod node;
pub mod transport;
