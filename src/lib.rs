//! `korri-cyphal` library: node-local transport adaptation for Cyphal over
//! CAN in a `no_std` environment. The crate bridges frames captured in
//! interrupt context to a transfer-layer protocol engine, dispatches
//! completed transfers to subscribed handlers, and drains the outbound
//! queue with deadline-based expiry.
#![no_std]
//==================================================================================
/// Core data types: node and port identifiers, priorities, transfer metadata.
pub mod core;
/// Engine, configuration and node errors.
pub mod error;
/// Transport plumbing (frames, RX queue, TX draining, collaborator traits)
/// and the node orchestrator.
pub mod protocol;
//==================================================================================
