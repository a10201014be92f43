/// Test doubles: statically allocated bus queues and frame builders.
use n2k_fusion::infra::codec::traits::Encode;
use n2k_fusion::protocol::transport::can_frame::CanFrame;
use n2k_fusion::protocol::transport::can_id::CanId;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_can::{ExtendedId, StandardId};

#[allow(dead_code)]
pub type BusQueue<const N: usize> = Channel<CriticalSectionRawMutex, CanFrame, N>;

/// Allocate a `'static` bus queue of the given depth, the way firmware does.
/// Each expansion owns its own cell, so call it once per test.
#[macro_export]
macro_rules! bus_queue {
    ($depth:expr) => {{
        static CELL: ::static_cell::StaticCell<
            ::embassy_sync::channel::Channel<
                ::embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
                ::n2k_fusion::protocol::transport::can_frame::CanFrame,
                $depth,
            >,
        > = ::static_cell::StaticCell::new();
        &*CELL.init(::embassy_sync::channel::Channel::new())
    }};
}

#[allow(dead_code)]
/// NMEA 2000 broadcast frame from `source`.
pub fn long_frame(pgn: u32, source: u8, msg: &impl Encode) -> CanFrame {
    let id = CanId::builder(pgn, source).build().unwrap();
    let (data, len) = msg.encode();
    CanFrame::extended(ExtendedId::new(id.0).unwrap(), &data[..len])
}

#[allow(dead_code)]
/// Proprietary frame on an 11-bit identifier.
pub fn short_frame(id: u16, msg: &impl Encode) -> CanFrame {
    let (data, len) = msg.encode();
    CanFrame::standard(StandardId::new(id).unwrap(), &data[..len])
}

#[allow(dead_code)]
/// Everything currently queued, oldest first.
pub fn drain<const N: usize>(queue: &BusQueue<N>) -> Vec<CanFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = queue.try_receive() {
        frames.push(frame);
    }
    frames
}
