//! Public traits exposed by the message codecs. They give inbound messages a
//! uniform decode/validity API and outbound messages a uniform pack API, so the
//! dispatcher and the node send loops stay independent of individual layouts.
use crate::error::DecodeError;
use crate::infra::codec::validity::Validity;

//==================================================================================DECODE
/// Implemented by every inbound message.
pub trait Decode: Sized {
    /// Minimum payload length of the layout.
    const LEN: usize;

    /// Decode a payload. Fails only when the payload is structurally unusable
    /// (too short); unavailable fields decode to `None`.
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;

    /// Wire-order validity mask of the decoded fields.
    fn validity(&self) -> Validity;
}

//==================================================================================ENCODE
/// Implemented by every outbound message: serialize into a full 8-byte frame
/// payload and report the number of meaningful bytes.
pub trait Encode {
    fn encode(&self) -> ([u8; 8], usize);
}
