//! Non-blocking access to the queue filled by the CAN receive interrupt.
use crate::protocol::transport::can_frame::CanFrame;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver};

/// Contract to pull already-received frames without waiting.
pub trait FrameSource {
    /// Next queued frame, or `None` when the queue is empty.
    fn try_recv(&mut self) -> Option<CanFrame>;
}

impl<M: RawMutex, const N: usize> FrameSource for Receiver<'_, M, CanFrame, N> {
    fn try_recv(&mut self) -> Option<CanFrame> {
        self.try_receive().ok()
    }
}

impl<M: RawMutex, const N: usize> FrameSource for &Channel<M, CanFrame, N> {
    fn try_recv(&mut self) -> Option<CanFrame> {
        self.try_receive().ok()
    }
}
