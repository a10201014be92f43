//! Non-blocking hand-off of outbound frames to the CAN transmit path.
use crate::protocol::transport::can_frame::CanFrame;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Sender, TrySendError};

/// Contract to enqueue a frame for transmission. Implementations must never
/// block: a busy bus is reported as an error and the caller drops the frame.
pub trait FrameSink {
    type Error: core::fmt::Debug;
    fn try_send(&mut self, frame: CanFrame) -> Result<(), Self::Error>;
}

impl<M: RawMutex, const N: usize> FrameSink for Sender<'_, M, CanFrame, N> {
    type Error = TrySendError<CanFrame>;

    fn try_send(&mut self, frame: CanFrame) -> Result<(), Self::Error> {
        Sender::try_send(self, frame)
    }
}

impl<M: RawMutex, const N: usize> FrameSink for &Channel<M, CanFrame, N> {
    type Error = TrySendError<CanFrame>;

    fn try_send(&mut self, frame: CanFrame) -> Result<(), Self::Error> {
        Channel::try_send(self, frame)
    }
}
