//! In-memory representation of a Cyphal/CAN frame: 29-bit identifier plus a
//! payload sized by the bus MTU (8 bytes classic, 64 bytes FD).
use embedded_can::{ExtendedId, Id};

use super::{CLASSIC_MTU, FD_MTU};

/// Mask keeping the 29 bits of an extended CAN identifier.
pub const EXTENDED_ID_MASK: u32 = 0x1FFF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Raw extended-identifier CAN frame.
pub struct CanFrame<const MTU: usize> {
    /// Full 29-bit CAN identifier stored inside a `u32`.
    pub extended_can_id: u32,
    /// Payload buffer; only the first `len` bytes are meaningful.
    pub data: [u8; MTU],
    /// Number of valid payload bytes.
    pub len: usize,
}

/// Classic CAN frame (8-byte payload).
pub type ClassicFrame = CanFrame<CLASSIC_MTU>;
/// CAN FD frame (64-byte payload).
pub type FdFrame = CanFrame<FD_MTU>;

impl<const MTU: usize> Default for CanFrame<MTU> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<const MTU: usize> CanFrame<MTU> {
    /// Zero-length frame with identifier 0.
    pub const EMPTY: Self = Self {
        extended_can_id: 0,
        data: [0; MTU],
        len: 0,
    };

    /// Build a frame, rejecting payloads larger than `MTU`.
    pub fn new(extended_can_id: u32, payload: &[u8]) -> Option<Self> {
        if payload.len() > MTU {
            return None;
        }
        Some(Self::truncated(extended_can_id, payload))
    }

    /// Build a frame, silently keeping only the first `MTU` payload bytes.
    /// Identifier bits above bit 28 are cleared.
    pub fn truncated(extended_can_id: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(MTU);
        let mut data = [0u8; MTU];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            extended_can_id: extended_can_id & EXTENDED_ID_MASK,
            data,
            len,
        }
    }

    /// Immutable view over the populated bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const MTU: usize> embedded_can::Frame for CanFrame<MTU> {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Extended(id) => CanFrame::<MTU>::new(id.as_raw(), data),
            // Cyphal/CAN only uses 29-bit identifiers.
            Id::Standard(_) => None,
        }
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        let raw = self.extended_can_id & EXTENDED_ID_MASK;
        Id::Extended(ExtendedId::new(raw).unwrap_or(ExtendedId::ZERO))
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
