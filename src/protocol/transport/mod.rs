//! Transport layer of the control bus: frame representation, 29-bit identifier
//! handling, and the queue abstractions the main loop reads from and writes to.
//!
//! ## Queue depths
//!
//! Reception is interrupt-fed into a fixed-depth queue that the dispatcher
//! drains completely once per tick. The depth therefore bounds the worst-case
//! work of a single tick. Transmission goes through a second fixed-depth queue;
//! a frame that does not fit is dropped and resent at its next scheduled period.

pub mod can_frame;
pub mod can_id;
pub mod traits;

/// Recommended receive queue depth: one tick's worth of traffic at 250 kbit/s
/// with a 100 Hz loop is about 20 frames; the margin absorbs bursts.
pub const RX_QUEUE_DEPTH: usize = 32;

/// Recommended transmit queue depth (largest per-tick burst of one node).
pub const TX_QUEUE_DEPTH: usize = 8;
