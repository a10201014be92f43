//! Infrastructure shared by the protocol layer: payload field access and the
//! codec contracts implemented by every message.
pub mod codec;
