//! Error definitions shared across library modules.
//! Decoding never fails on individual fields (validity masks carry that), so the
//! types below only cover structural failures: identifier construction, payloads
//! too short to hold a message, and scheduler registration.
use thiserror_no_std::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur while building a 29-bit CAN identifier.
pub enum CanIdBuildError {
    /// Attempt to build a broadcast message (PDU2) from a PGN with PF < 240.
    #[error("PGN {pgn} is not a broadcast PGN: PF is too low")]
    InvalidForBroadcast { pgn: u32 },
    /// Raw value does not fit in the identifier width.
    #[error("Identifier {raw:#x} out of range")]
    OutOfRange { raw: u32 },
}

//================================================================================DECODE_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Structural failures while turning a payload into a message.
pub enum DecodeError {
    /// Payload is shorter than the message layout.
    #[error("Invalid data length -> expected: {expected}, actual: {actual}")]
    InvalidDataLength { expected: usize, actual: usize },
}

//================================================================================SCHEDULE_ERROR
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Registration failures in the message scheduler.
pub enum ScheduleError {
    /// Every slot of the registry is already taken.
    #[error("Scheduler registry is full")]
    RegistryFull,
    /// The message id is already registered.
    #[error("Message {id} already scheduled")]
    DuplicateId { id: u8 },
    /// Requested rate is zero or faster than the node tick.
    #[error("Invalid rate {rate_hz} Hz for a {tick_hz} Hz tick")]
    InvalidRate { rate_hz: u8, tick_hz: u16 },
}

//================================================================================NODE_INIT_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Fatal configuration errors raised while bringing a node up. A node that
/// fails here must not enter its main loop.
pub enum NodeInitError {
    /// A mandatory periodic transmission could not be registered.
    #[error("Mandatory message {id} could not be scheduled: {reason}")]
    Schedule { id: u8, reason: ScheduleError },
    /// The configured node id is outside the bus node table.
    #[error("Node id {node_id} is outside the node table")]
    InvalidNodeId { node_id: u8 },
}
