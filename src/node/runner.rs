//! Main loop shared by every node type.
//!
//! Each tick runs three steps in a fixed order:
//!
//! 1. drain every frame the receive interrupt queued and hand it to the node;
//! 2. age the node's time-based state;
//! 3. ask the scheduler which messages are due, pack them and enqueue them.
//!
//! The transmit queue is never waited on: a frame that does not fit is
//! dropped and counted, and the next period sends fresh data anyway.
use crate::error::NodeInitError;
use crate::node::{Node, NodeScheduler};
use crate::protocol::transport::traits::frame_sink::FrameSink;
use crate::protocol::transport::traits::frame_source::FrameSource;
use embassy_time::{Duration, Ticker};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Frames taken from the receive queue.
    pub received: usize,
    /// Frames accepted by the transmit queue.
    pub sent: usize,
    /// Due frames the transmit queue refused.
    pub dropped: usize,
}

/// Drives a [`Node`] between a frame source and a frame sink.
pub struct NodeRunner<N: Node, S: FrameSource, K: FrameSink> {
    node: N,
    source: S,
    sink: K,
    scheduler: NodeScheduler,
    tick: u32,
}

impl<N, S, K> NodeRunner<N, S, K>
where
    N: Node,
    S: FrameSource,
    K: FrameSink,
{
    /// Register the node's mandatory messages. Any registration failure is
    /// fatal and reported with the offending message id.
    pub fn new(node: N, source: S, sink: K) -> Result<Self, NodeInitError> {
        let mut scheduler = NodeScheduler::new(node.config().tick_hz);
        for &(id, rate_hz) in node.schedule() {
            scheduler
                .add(id, rate_hz)
                .map_err(|reason| NodeInitError::Schedule { id, reason })?;
        }
        Ok(Self {
            node,
            source,
            sink,
            scheduler,
            tick: 0,
        })
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    pub fn scheduler(&self) -> &NodeScheduler {
        &self.scheduler
    }

    /// Ticks run so far.
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    /// Run one receive, age, transmit cycle.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        while let Some(frame) = self.source.try_recv() {
            self.node.handle_frame(&frame, &mut self.scheduler);
            report.received += 1;
        }

        self.node.age();

        self.tick = self.tick.wrapping_add(1);
        for id in self.scheduler.due(self.tick) {
            let Some(frame) = self.node.pack(id) else {
                continue;
            };
            match self.sink.try_send(frame) {
                Ok(()) => report.sent += 1,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Transmit queue full, dropped message {}", id);
                    report.dropped += 1;
                }
            }
        }

        report
    }

    /// Tick forever at the configured rate.
    pub async fn run(mut self) {
        let tick_hz = u64::from(self.node.config().tick_hz);
        let mut ticker = Ticker::every(Duration::from_hz(tick_hz));
        loop {
            ticker.next().await;
            let _report = self.tick();
            #[cfg(feature = "defmt")]
            defmt::trace!("Tick {}: {}", self.tick, _report);
        }
    }
}
