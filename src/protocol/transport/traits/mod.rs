//! Abstraction traits used by the transport layer: non-blocking frame intake
//! from the receive queue and non-blocking hand-off to the transmit queue.
pub mod frame_sink;
pub mod frame_source;
