//! Creation and extraction of the 29-bit ISO 11783 identifiers carried by
//! NMEA 2000 frames (the "long" identifier form on this bus).
use crate::error::CanIdBuildError;
use embedded_can::ExtendedId;

/// Default priority for periodic sensor data.
pub const PRIORITY_DEFAULT: u8 = 6;
/// Priority used for rapid-update navigation and actuator feedback.
pub const PRIORITY_RAPID: u8 = 2;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Extended CAN identifier with accessors for priority, PGN and source
/// address.
pub struct CanId(pub u32);

impl CanId {
    /// Creates a pre-configured `CanIdBuilder` for a PGN and source address.
    pub fn builder(pgn: u32, source_address: u8) -> CanIdBuilder {
        CanIdBuilder::new(pgn, source_address)
    }

    /// Priority (3 bits, value 0-7).
    pub fn priority(&self) -> u8 {
        ((self.0 >> 26) & 0x07) as u8
    }

    /// 18-bit PGN, handling the PDU1/PDU2 distinction. Priority and source
    /// address never influence the result.
    pub fn pgn(&self) -> u32 {
        let ps = (self.0 >> 8) & 0xFF;
        let pf = (self.0 >> 16) & 0xFF;
        let dp = (self.0 >> 24) & 0x01;
        let r = (self.0 >> 25) & 0x01;

        if pf >= 240 {
            // PDU2: PS is the group extension and belongs to the PGN.
            (r << 17) | (dp << 16) | (pf << 8) | ps
        } else {
            // PDU1: PS is the destination address.
            (r << 17) | (dp << 16) | (pf << 8)
        }
    }

    /// Eight-bit source address.
    pub fn source_address(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl From<ExtendedId> for CanId {
    fn from(id: ExtendedId) -> Self {
        CanId(id.as_raw())
    }
}

impl TryFrom<CanId> for ExtendedId {
    type Error = CanIdBuildError;

    fn try_from(id: CanId) -> Result<Self, Self::Error> {
        ExtendedId::new(id.0).ok_or(CanIdBuildError::OutOfRange { raw: id.0 })
    }
}

//==================================================================================CAN_ID_BUILDER
#[derive(Debug)]
/// Fluent builder for broadcast (PDU2) identifiers, the only form nodes on
/// this bus transmit.
pub struct CanIdBuilder {
    pub priority: u8,
    pub pgn: u32,
    pub source_address: u8,
}

impl CanIdBuilder {
    pub fn new(pgn: u32, source_address: u8) -> Self {
        Self {
            priority: PRIORITY_DEFAULT,
            pgn,
            source_address,
        }
    }

    /// Sets the priority, masked to 3 bits.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority & 0x07;
        self
    }

    /// Builds the identifier. PGNs with PF < 240 are addressed (PDU1) and
    /// rejected.
    pub fn build(self) -> Result<CanId, CanIdBuildError> {
        let pf = ((self.pgn >> 8) & 0xFF) as u8;
        if pf < 240 {
            return Err(CanIdBuildError::InvalidForBroadcast { pgn: self.pgn });
        }

        Ok(CanId(
            ((self.priority as u32) << 26)
                | ((self.pgn & 0x3_FFFF) << 8)
                | (self.source_address as u32),
        ))
    }
}
