//! Cyphal/CAN transport plumbing: frame representations, the interrupt-safe
//! receive queue, transmit-queue draining, and the traits through which the
//! node reaches its collaborators (protocol engine, allocator, clock, handlers).
//!
//! ## Frame sizes
//!
//! Every frame-carrying type is generic over its payload capacity `MTU`.
//! Classic CAN carries at most [`CLASSIC_MTU`] bytes, CAN FD at most [`FD_MTU`].

use embassy_time::Duration;

pub mod can_frame;
pub mod rx_queue;
pub mod traits;
pub mod tx_queue;

/// Payload capacity of a classic CAN 2.0 frame (bytes).
pub const CLASSIC_MTU: usize = 8;

/// Payload capacity of a CAN FD frame (bytes).
pub const FD_MTU: usize = 64;

/// Default transfer-ID timeout applied to new subscriptions.
///
/// Matches the Cyphal recommendation: a transfer carrying an already-seen
/// transfer-ID is treated as a duplicate for two seconds, after which the
/// session is considered restarted.
pub const DEFAULT_TRANSFER_ID_TIMEOUT: Duration = Duration::from_secs(2);
