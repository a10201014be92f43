//! Liveness of the sensors and nodes seen on the bus.
//!
//! Every sensor class carries two hysteresis records: `enabled` (the device is
//! talking) and `active` (it is producing data the control loop can use).
//! Frames reset the counters; [`AvailabilityTracker::tick`] ages them once per
//! main-loop tick, independently of traffic. Remote nodes get a simpler single
//! counter that snaps their status to sentinel values when it runs out.
use crate::config::NUM_NODES;
use crate::protocol::messages::proprietary::NodeStatusMsg;

//==================================================================================SENSOR
/// Sensor classes tracked by the primary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
    Gps,
    Imu,
    WindStation,
    DepthSounder,
    Power,
    Propulsion,
    Rudder,
    RcNode,
    Gyro,
}

impl Sensor {
    pub const COUNT: usize = 9;

    pub const ALL: [Sensor; Self::COUNT] = [
        Sensor::Gps,
        Sensor::Imu,
        Sensor::WindStation,
        Sensor::DepthSounder,
        Sensor::Power,
        Sensor::Propulsion,
        Sensor::Rudder,
        Sensor::RcNode,
        Sensor::Gyro,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

//==================================================================================HYSTERESIS
/// Debounced presence flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hysteresis {
    pub flag: bool,
    pub counter: u16,
}

impl Hysteresis {
    /// Startup state: absent, with the counter already expired.
    pub const fn expired(timeout: u16) -> Self {
        Self {
            flag: false,
            counter: timeout,
        }
    }

    /// Fresh evidence.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// One tick of aging.
    ///
    /// A raised flag counts up to `timeout` and drops on the following tick.
    /// A lowered flag rises again on the first tick its counter is below
    /// `timeout`, which only happens after a reset: recovery takes one tick,
    /// while loss takes `timeout + 1` ticks.
    pub fn age(&mut self, timeout: u16) {
        if self.flag {
            if self.counter < timeout {
                self.counter += 1;
            } else {
                self.flag = false;
            }
        } else if self.counter < timeout {
            self.flag = true;
        }
    }
}

/// `enabled` / `active` pair of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorState {
    pub enabled: Hysteresis,
    pub active: Hysteresis,
}

//==================================================================================TRACKER
#[derive(Debug, Clone)]
pub struct AvailabilityTracker {
    sensors: [SensorState; Sensor::COUNT],
    timeout: u16,
}

impl AvailabilityTracker {
    /// Every sensor starts disconnected.
    pub fn new(timeout: u16) -> Self {
        let expired = SensorState {
            enabled: Hysteresis::expired(timeout),
            active: Hysteresis::expired(timeout),
        };
        Self {
            sensors: [expired; Sensor::COUNT],
            timeout,
        }
    }

    pub fn reset_enabled(&mut self, sensor: Sensor) {
        self.sensors[sensor.index()].enabled.reset();
    }

    pub fn reset_active(&mut self, sensor: Sensor) {
        self.sensors[sensor.index()].active.reset();
    }

    /// Age every record once. Must be called exactly once per tick.
    pub fn tick(&mut self) {
        for state in self.sensors.iter_mut() {
            state.enabled.age(self.timeout);
            state.active.age(self.timeout);
        }
    }

    pub fn state(&self, sensor: Sensor) -> SensorState {
        self.sensors[sensor.index()]
    }

    pub fn is_enabled(&self, sensor: Sensor) -> bool {
        self.sensors[sensor.index()].enabled.flag
    }

    pub fn is_active(&self, sensor: Sensor) -> bool {
        self.sensors[sensor.index()].active.flag
    }
}

//==================================================================================NODE_TABLE
/// Last status reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeStatus {
    pub load: u8,
    pub temperature: i8,
    pub voltage: u8,
    pub status: u16,
    pub errors: u16,
}

impl NodeStatus {
    /// Every field at its maximum: unknown or stale.
    pub const UNKNOWN: Self = Self {
        load: u8::MAX,
        temperature: i8::MAX,
        voltage: u8::MAX,
        status: u16::MAX,
        errors: u16::MAX,
    };

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeEntry {
    status: NodeStatus,
    counter: u16,
}

/// Status of every node id on the bus, aged like the sensors but without
/// hysteresis. The local node's own entry is never aged.
#[derive(Debug, Clone)]
pub struct NodeTable {
    entries: [NodeEntry; NUM_NODES],
    local_node: u8,
    timeout: u16,
}

impl NodeTable {
    pub fn new(local_node: u8, timeout: u16) -> Self {
        Self {
            entries: [NodeEntry {
                status: NodeStatus::UNKNOWN,
                counter: timeout,
            }; NUM_NODES],
            local_node,
            timeout,
        }
    }

    fn slot(node: u8) -> Option<usize> {
        (node >= 1 && node as usize <= NUM_NODES).then(|| node as usize - 1)
    }

    /// Store a received status and restart the node's timeout. Returns
    /// `false` for node ids outside the table.
    pub fn update(&mut self, msg: &NodeStatusMsg) -> bool {
        let Some(slot) = Self::slot(msg.node) else {
            return false;
        };
        self.entries[slot] = NodeEntry {
            status: NodeStatus {
                load: msg.load,
                temperature: msg.temperature,
                voltage: msg.voltage,
                status: msg.status,
                errors: msg.errors,
            },
            counter: 0,
        };
        true
    }

    /// Age every remote entry once; an entry whose counter reaches the
    /// timeout is forced to [`NodeStatus::UNKNOWN`].
    pub fn tick(&mut self) {
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            if slot + 1 == self.local_node as usize {
                continue;
            }
            if entry.counter < self.timeout {
                entry.counter += 1;
            }
            if entry.counter >= self.timeout && !entry.status.is_unknown() {
                #[cfg(feature = "defmt")]
                defmt::info!("Node {} timed out", slot + 1);
                entry.status = NodeStatus::UNKNOWN;
            }
        }
    }

    pub fn get(&self, node: u8) -> Option<NodeStatus> {
        Self::slot(node).map(|slot| self.entries[slot].status)
    }

    /// Whether a status from `node` arrived within the timeout window. The
    /// local node is always online.
    pub fn is_online(&self, node: u8) -> bool {
        Self::slot(node).is_some_and(|slot| {
            node == self.local_node || self.entries[slot].counter < self.timeout
        })
    }
}
