//! Payload codecs: field reader/writer with NMEA 2000 "not available"
//! handling, validity masks, and the decode/encode traits.
pub mod bits;
pub mod traits;
pub mod validity;
