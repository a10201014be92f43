//! Bus-facing components: frame transport and message codecs.
pub mod messages;
pub mod transport;
