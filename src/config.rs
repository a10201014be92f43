//! Per-node runtime configuration: identity on the bus, tick rate of the main
//! loop, and the liveness timeouts expressed in ticks.

/// Number of entries in the bus node table (node ids `1..=NUM_NODES`).
pub const NUM_NODES: usize = 7;

/// Default main-loop frequency.
pub const DEFAULT_TICK_HZ: u16 = 100;
/// Default sensor liveness window (2 s at the default tick).
pub const DEFAULT_SENSOR_TIMEOUT: u16 = 200;
/// Default node liveness window (1 s at the default tick).
pub const DEFAULT_NODE_TIMEOUT: u16 = 100;

/// Well-known node ids on the control bus.
pub mod node_ids {
    pub const PRIMARY_CONTROLLER: u8 = 1;
    pub const RC: u8 = 2;
    pub const RUDDER_CONTROLLER: u8 = 3;
    pub const POWER: u8 = 4;
    pub const IMU: u8 = 5;
    pub const HIL: u8 = 6;
    pub const DATALOGGER: u8 = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Static configuration shared by the fusion context, the scheduler and the
/// node runner.
pub struct FusionConfig {
    /// Local node id (`1..=NUM_NODES`). Its own node table entry is never aged.
    pub node_id: u8,
    /// Frequency of the main loop, used to turn rates into tick periods.
    pub tick_hz: u16,
    /// Ticks without evidence before a sensor flag drops.
    pub sensor_timeout: u16,
    /// Ticks without a status message before a node snaps to unknown.
    pub node_timeout: u16,
}

impl FusionConfig {
    /// Configuration with default timing for the given node id.
    pub const fn new(node_id: u8) -> Self {
        Self {
            node_id,
            tick_hz: DEFAULT_TICK_HZ,
            sensor_timeout: DEFAULT_SENSOR_TIMEOUT,
            node_timeout: DEFAULT_NODE_TIMEOUT,
        }
    }

    pub const fn with_tick_hz(mut self, tick_hz: u16) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    pub const fn with_sensor_timeout(mut self, ticks: u16) -> Self {
        self.sensor_timeout = ticks;
        self
    }

    pub const fn with_node_timeout(mut self, ticks: u16) -> Self {
        self.node_timeout = ticks;
        self
    }

    /// Whether the node id maps onto the node table.
    pub const fn has_valid_node_id(&self) -> bool {
        self.node_id >= 1 && self.node_id as usize <= NUM_NODES
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::new(node_ids::PRIMARY_CONTROLLER)
    }
}
