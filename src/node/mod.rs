//! Node firmware glue: what a node does with inbound frames, which messages it
//! transmits periodically and how each one is packed.
//!
//! A [`Node`] is driven by a [`runner::NodeRunner`], which owns the frame
//! queues and the [`MessageScheduler`] and enforces the per-tick order
//! receive, age, transmit.
pub mod primary;
pub mod rudder;
pub mod runner;

use crate::config::FusionConfig;
use crate::infra::codec::traits::Encode;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::scheduler::MessageScheduler;
use embedded_can::{ExtendedId, StandardId};

/// Periodic messages a node may register.
pub const SCHEDULE_CAPACITY: usize = 8;

/// Scheduler type shared by every node.
pub type NodeScheduler = MessageScheduler<SCHEDULE_CAPACITY>;

/// Behavior of one node type on the bus.
pub trait Node {
    fn config(&self) -> &FusionConfig;

    /// Mandatory periodic messages as `(message id, rate in Hz)`. Failing to
    /// register any of them aborts startup.
    fn schedule(&self) -> &'static [(u8, u8)];

    /// Consume one inbound frame. The scheduler is handed over so that rate
    /// commands can reshape it. Returns whether the frame was understood.
    fn handle_frame(&mut self, frame: &CanFrame, scheduler: &mut NodeScheduler) -> bool;

    /// Advance time-based state by one tick.
    fn age(&mut self) {}

    /// Build the frame for a due message id. `None` for ids the node does not
    /// know or frames that cannot be built.
    fn pack(&mut self, message: u8) -> Option<CanFrame>;
}

/// Proprietary message on an 11-bit identifier.
pub(crate) fn short_frame<M: Encode>(id: u16, msg: &M) -> Option<CanFrame> {
    let id = StandardId::new(id)?;
    let (data, len) = msg.encode();
    Some(CanFrame::standard(id, &data[..len]))
}

/// Broadcast NMEA 2000 message sent from `source`.
pub(crate) fn long_frame<M: Encode>(
    pgn: u32,
    priority: u8,
    source: u8,
    msg: &M,
) -> Option<CanFrame> {
    let id = match CanId::builder(pgn, source).with_priority(priority).build() {
        Ok(id) => id,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Cannot build identifier for PGN {}: {}", pgn, _e);
            return None;
        }
    };
    let id = ExtendedId::try_from(id).ok()?;
    let (data, len) = msg.encode();
    Some(CanFrame::extended(id, &data[..len]))
}
