//! Abstraction traits used by the node to reach its collaborators
//! (protocol engine, scratch allocator, time source, transfer handlers).
pub mod korri_clock;
pub mod protocol_engine;
pub mod transfer_allocator;
pub mod transfer_handler;
