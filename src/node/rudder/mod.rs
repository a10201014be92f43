//! Rudder actuator node: measures the rudder position from a potentiometer,
//! publishes it with its calibration and limit state, and listens for
//! commanded angles, calibration requests and rate changes.
//!
//! The calibration sweep itself belongs to the actuator firmware; this node
//! only records the request and publishes the calibration data it is given.
use crate::config::FusionConfig;
use crate::error::NodeInitError;
use crate::infra::codec::traits::Decode;
use crate::node::{long_frame, short_frame, Node, NodeScheduler};
use crate::protocol::messages::n2k::{
    EnvironmentalParameters2, Rudder, PGN_ENV_PARAMETERS2, PGN_RUDDER, TEMPERATURE_INSTANCE_INSIDE,
};
use crate::protocol::messages::proprietary::{
    ids, NodeStatusMsg, RateCommand, RudderDetails, RudderSetState,
};
use crate::protocol::transport::can_frame::{CanFrame, FrameKind};
use crate::protocol::transport::can_id::PRIORITY_RAPID;
use crate::scheduler::RateRequest;

/// Scheduler ids of the rudder node's periodic messages.
pub mod messages {
    pub const ANGLE: u8 = 1;
    pub const DETAILS: u8 = 2;
    pub const TEMPERATURE: u8 = 3;
    pub const STATUS: u8 = 4;
}

const SCHEDULE: &[(u8, u8)] = &[
    (messages::ANGLE, 10),
    (messages::DETAILS, 4),
    (messages::TEMPERATURE, 1),
    (messages::STATUS, 2),
];

/// Mechanical travel on each side of center, radians (45°).
pub const MAX_DEFLECTION: f32 = 0.7854;

const STATUS_CALIBRATED: u16 = 1 << 0;
const STATUS_CALIBRATING: u16 = 1 << 1;
const STATUS_STARBOARD_LIMIT: u16 = 1 << 2;
const STATUS_PORT_LIMIT: u16 = 1 << 3;

/// Map a potentiometer reading onto the rudder angle. The starboard limit
/// maps to `-MAX_DEFLECTION`, the port limit to `+MAX_DEFLECTION`; readings
/// beyond either limit are clamped. An uncalibrated (empty) range yields 0.
pub fn pot_to_radians(pot: u16, starboard_limit: u16, port_limit: u16) -> f32 {
    let range = i32::from(starboard_limit) - i32::from(port_limit);
    if range == 0 {
        return 0.0;
    }
    let offset = (i32::from(pot) - i32::from(port_limit)) as f32;
    let angle = (0.5 - offset / range as f32) * 2.0 * MAX_DEFLECTION;
    angle.clamp(-MAX_DEFLECTION, MAX_DEFLECTION)
}

/// Raw inputs sampled by the actuator firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RudderSensors {
    pub pot: u16,
    pub port_limit_hit: bool,
    pub starboard_limit_hit: bool,
    /// Enclosure temperature, °C.
    pub temperature: f32,
}

/// Potentiometer values recorded at each end stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub port_limit: u16,
    pub starboard_limit: u16,
    pub calibrated: bool,
    pub calibrating: bool,
}

#[derive(Debug, Clone)]
pub struct RudderNode {
    config: FusionConfig,
    sensors: RudderSensors,
    calibration: Calibration,
    angle: f32,
    commanded_angle: f32,
    calibration_requested: bool,
}

impl RudderNode {
    pub fn new(config: FusionConfig) -> Result<Self, NodeInitError> {
        if !config.has_valid_node_id() {
            return Err(NodeInitError::InvalidNodeId {
                node_id: config.node_id,
            });
        }
        Ok(Self {
            config,
            sensors: RudderSensors::default(),
            calibration: Calibration::default(),
            angle: 0.0,
            commanded_angle: 0.0,
            calibration_requested: false,
        })
    }

    /// Store a new sample and recompute the rudder angle.
    pub fn update_sensors(&mut self, sensors: RudderSensors) {
        self.sensors = sensors;
        self.refresh_angle();
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
        self.refresh_angle();
    }

    pub fn sensors(&self) -> RudderSensors {
        self.sensors
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Measured angle, radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Last angle commanded over PGN 127245, radians.
    pub fn commanded_angle(&self) -> f32 {
        self.commanded_angle
    }

    /// Whether a calibration was requested since the last call. Reading the
    /// request clears it.
    pub fn take_calibration_request(&mut self) -> bool {
        core::mem::take(&mut self.calibration_requested)
    }

    fn refresh_angle(&mut self) {
        self.angle = pot_to_radians(
            self.sensors.pot,
            self.calibration.starboard_limit,
            self.calibration.port_limit,
        );
    }

    //==============================================================================OUTBOUND
    pub fn angle_message(&self) -> Rudder {
        Rudder {
            position: Some(self.angle),
            ..Rudder::default()
        }
    }

    pub fn details_message(&self) -> RudderDetails {
        RudderDetails {
            pot: self.sensors.pot,
            starboard_limit: self.calibration.starboard_limit,
            port_limit: self.calibration.port_limit,
            port_limit_hit: self.sensors.port_limit_hit,
            starboard_limit_hit: self.sensors.starboard_limit_hit,
            enabled: true,
            calibrated: self.calibration.calibrated,
            calibrating: self.calibration.calibrating,
        }
    }

    pub fn temperature_message(&self) -> EnvironmentalParameters2 {
        EnvironmentalParameters2 {
            temperature_instance: Some(TEMPERATURE_INSTANCE_INSIDE),
            temperature: Some(self.sensors.temperature),
            ..EnvironmentalParameters2::default()
        }
    }

    /// Status word: calibrated (bit 0), calibrating (bit 1), starboard limit
    /// (bit 2), port limit (bit 3). Load, temperature and voltage are not
    /// measured on this board and go out as "not available".
    pub fn status_message(&self) -> NodeStatusMsg {
        let mut status = 0;
        if self.calibration.calibrated {
            status |= STATUS_CALIBRATED;
        }
        if self.calibration.calibrating {
            status |= STATUS_CALIBRATING;
        }
        if self.sensors.starboard_limit_hit {
            status |= STATUS_STARBOARD_LIMIT;
        }
        if self.sensors.port_limit_hit {
            status |= STATUS_PORT_LIMIT;
        }
        NodeStatusMsg {
            node: self.config.node_id,
            load: u8::MAX,
            temperature: i8::MAX,
            voltage: u8::MAX,
            status,
            errors: 0,
        }
    }

    //==============================================================================INBOUND
    fn set_state(&mut self, payload: &[u8]) -> bool {
        let Ok(request) = RudderSetState::decode(payload) else {
            return false;
        };
        if request.calibrate && !self.calibration.calibrating {
            #[cfg(feature = "defmt")]
            defmt::info!("Rudder calibration requested");
            self.calibration_requested = true;
        }
        true
    }

    /// Primary rate drives the angle message, secondary the details message.
    fn set_tx_rate(&mut self, payload: &[u8], scheduler: &mut NodeScheduler) -> bool {
        let Ok(command) = RateCommand::decode(payload) else {
            return false;
        };
        for (id, raw) in [
            (messages::ANGLE, command.primary),
            (messages::DETAILS, command.secondary),
        ] {
            if let Err(_e) = scheduler.apply_rate(id, RateRequest::from(raw)) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Rate change for message {} rejected: {}", id, _e);
            }
        }
        true
    }

    fn commanded(&mut self, payload: &[u8]) -> bool {
        let Ok(msg) = Rudder::decode(payload) else {
            return false;
        };
        if let Some(angle) = msg.angle_order {
            self.commanded_angle = angle;
        }
        true
    }
}

impl Node for RudderNode {
    fn config(&self) -> &FusionConfig {
        &self.config
    }

    fn schedule(&self) -> &'static [(u8, u8)] {
        SCHEDULE
    }

    fn handle_frame(&mut self, frame: &CanFrame, scheduler: &mut NodeScheduler) -> bool {
        match frame.kind() {
            FrameKind::Short(ids::RUDDER_SET_STATE) => self.set_state(frame.payload()),
            FrameKind::Short(ids::RUDDER_SET_TX_RATE) => {
                self.set_tx_rate(frame.payload(), scheduler)
            }
            FrameKind::Long(id) if id.pgn() == PGN_RUDDER => self.commanded(frame.payload()),
            _other => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Rudder node ignores {:?}", _other);
                false
            }
        }
    }

    fn pack(&mut self, message: u8) -> Option<CanFrame> {
        let source = self.config.node_id;
        match message {
            messages::ANGLE => long_frame(PGN_RUDDER, PRIORITY_RAPID, source, &self.angle_message()),
            messages::DETAILS => short_frame(ids::RUDDER_DETAILS, &self.details_message()),
            messages::TEMPERATURE => long_frame(
                PGN_ENV_PARAMETERS2,
                PRIORITY_RAPID,
                source,
                &self.temperature_message(),
            ),
            messages::STATUS => short_frame(ids::STATUS, &self.status_message()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
