//! In-memory representation of a frame on the control bus. Two identifier forms
//! share the bus: 11-bit standard identifiers carry the proprietary control
//! messages, 29-bit extended identifiers carry NMEA 2000 PGNs.
use crate::protocol::transport::can_id::CanId;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Raw frame as read from, or handed to, the CAN controller.
pub struct CanFrame {
    /// Standard (short) or extended (long) identifier.
    pub id: Id,
    /// Payload buffer. Unused bytes are kept at `0xFF`.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

/// Identifier of a frame once classified by form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Proprietary message, raw 11-bit identifier.
    Short(u16),
    /// NMEA 2000 message.
    Long(CanId),
}

impl CanFrame {
    /// Frame with a standard identifier. Payloads longer than eight bytes are
    /// truncated.
    pub fn standard(id: StandardId, payload: &[u8]) -> Self {
        Self::with_id(Id::Standard(id), payload)
    }

    /// Frame with an extended identifier.
    pub fn extended(id: ExtendedId, payload: &[u8]) -> Self {
        Self::with_id(Id::Extended(id), payload)
    }

    fn with_id(id: Id, payload: &[u8]) -> Self {
        let len = payload.len().min(8);
        let mut data = [0xFF; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self { id, data, len }
    }

    pub fn kind(&self) -> FrameKind {
        match self.id {
            Id::Standard(id) => FrameKind::Short(id.as_raw()),
            Id::Extended(id) => FrameKind::Long(CanId::from(id)),
        }
    }

    /// Valid payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        Some(Self::with_id(id.into(), data))
    }

    // Remote frames are not used on this bus.
    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
