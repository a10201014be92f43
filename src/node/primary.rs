//! Primary (autopilot) node: fuses every sensor on the bus and reports its
//! own health.
use crate::config::FusionConfig;
use crate::error::NodeInitError;
use crate::fusion::dispatcher;
use crate::fusion::FusionContext;
use crate::node::{short_frame, Node, NodeScheduler};
use crate::protocol::messages::proprietary::{ids, NodeStatusMsg};
use crate::protocol::transport::can_frame::CanFrame;

/// Scheduler ids of the primary node's periodic messages.
pub mod messages {
    pub const STATUS: u8 = 1;
}

const SCHEDULE: &[(u8, u8)] = &[(messages::STATUS, 2)];

/// Health figures measured by the embedding firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalStatus {
    /// CPU load, percent.
    pub load: u8,
    /// Board temperature, °C.
    pub temperature: i8,
    /// Supply voltage, 0.1 V.
    pub voltage: u8,
    pub status: u16,
    pub errors: u16,
}

#[derive(Debug, Clone)]
pub struct PrimaryNode {
    fusion: FusionContext,
    status: LocalStatus,
}

impl PrimaryNode {
    pub fn new(config: FusionConfig) -> Result<Self, NodeInitError> {
        if !config.has_valid_node_id() {
            return Err(NodeInitError::InvalidNodeId {
                node_id: config.node_id,
            });
        }
        Ok(Self {
            fusion: FusionContext::new(config),
            status: LocalStatus::default(),
        })
    }

    pub fn fusion(&self) -> &FusionContext {
        &self.fusion
    }

    /// Mutable access for consumers of the data store (`get_*` clears the
    /// new-data flags).
    pub fn fusion_mut(&mut self) -> &mut FusionContext {
        &mut self.fusion
    }

    pub fn set_status(&mut self, status: LocalStatus) {
        self.status = status;
    }

    pub fn status_message(&self) -> NodeStatusMsg {
        NodeStatusMsg {
            node: self.fusion.config.node_id,
            load: self.status.load,
            temperature: self.status.temperature,
            voltage: self.status.voltage,
            status: self.status.status,
            errors: self.status.errors,
        }
    }
}

impl Node for PrimaryNode {
    fn config(&self) -> &FusionConfig {
        &self.fusion.config
    }

    fn schedule(&self) -> &'static [(u8, u8)] {
        SCHEDULE
    }

    fn handle_frame(&mut self, frame: &CanFrame, _scheduler: &mut NodeScheduler) -> bool {
        dispatcher::dispatch(&mut self.fusion, frame)
    }

    fn age(&mut self) {
        self.fusion.tick();
    }

    fn pack(&mut self, message: u8) -> Option<CanFrame> {
        match message {
            messages::STATUS => short_frame(ids::STATUS, &self.status_message()),
            _ => None,
        }
    }
}
