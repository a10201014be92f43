//! Proprietary messages carried on 11-bit standard identifiers.
//!
//! These layouts have no "not available" convention: every field is always
//! present, so the validity mask of a successful decode has every field bit
//! set. All multi-byte fields are little-endian.
use crate::error::DecodeError;
use crate::infra::codec::bits::{scaled, unscaled, FieldReader, FieldWriter};
use crate::infra::codec::traits::{Decode, Encode};
use crate::infra::codec::validity::Validity;

/// Standard identifiers of the control bus.
pub mod ids {
    /// Node status, transmitted by every node at 2 Hz.
    pub const STATUS: u16 = 0x080;
    pub const RUDDER_DETAILS: u16 = 0x081;
    pub const RUDDER_SET_STATE: u16 = 0x082;
    pub const RUDDER_SET_TX_RATE: u16 = 0x083;
    pub const IMU_DATA: u16 = 0x084;
    pub const GYRO_DATA: u16 = 0x085;
    pub const ANG_VEL_DATA: u16 = 0x086;
    pub const ACCEL_DATA: u16 = 0x087;
    pub const GPS_POS_DATA: u16 = 0x088;
    pub const GPS_EST_POS_DATA: u16 = 0x089;
    pub const GPS_VEL_DATA: u16 = 0x08A;
    /// ACS300 motor controller.
    pub const ACS300_WR_PARAM: u16 = 0x401;
    pub const ACS300_HEARTBEAT: u16 = 0x402;
}

/// ACS300 parameter holding the commanded current (throttle).
pub const ACS300_PARAM_CC: u16 = 0x0F;

const RES_ANGLE: f64 = 1e-4;
const RES_RATE: f64 = 1e-4;
const RES_ACCEL: f64 = 1e-3;
const RES_SPEED: f64 = 0.01;

const fn all_fields(count: u8) -> Validity {
    Validity::from_bits((1u16 << count) - 1)
}

//==================================================================================STATUS
/// `0x080` – periodic health report of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeStatusMsg {
    /// Reporting node id (`1..=NUM_NODES`).
    pub node: u8,
    /// CPU load, percent.
    pub load: u8,
    /// Board temperature, °C.
    pub temperature: i8,
    /// Supply voltage, 0.1 V.
    pub voltage: u8,
    pub status: u16,
    pub errors: u16,
}

impl Decode for NodeStatusMsg {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            node: r.raw_u8(0),
            load: r.raw_u8(1),
            temperature: r.raw_i8(2),
            voltage: r.raw_u8(3),
            status: r.raw_u16(4),
            errors: r.raw_u16(6),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(6)
    }
}

impl Encode for NodeStatusMsg {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_u8(0, self.node)
            .raw_u8(1, self.load)
            .raw_i8(2, self.temperature)
            .raw_u8(3, self.voltage)
            .raw_u16(4, self.status)
            .raw_u16(6, self.errors);
        (w.finish(), Self::LEN)
    }
}

//==================================================================================RUDDER_DETAILS
const DETAIL_PORT_HIT: u8 = 1 << 0;
const DETAIL_STARBOARD_HIT: u8 = 1 << 1;
const DETAIL_ENABLED: u8 = 1 << 2;
const DETAIL_CALIBRATED: u8 = 1 << 3;
const DETAIL_CALIBRATING: u8 = 1 << 4;

/// `0x081` – raw potentiometer reading, calibrated limits and state flags of
/// the rudder actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RudderDetails {
    pub pot: u16,
    pub starboard_limit: u16,
    pub port_limit: u16,
    pub port_limit_hit: bool,
    pub starboard_limit_hit: bool,
    pub enabled: bool,
    pub calibrated: bool,
    pub calibrating: bool,
}

impl Decode for RudderDetails {
    const LEN: usize = 7;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        let flags = r.raw_u8(6);
        Ok(Self {
            pot: r.raw_u16(0),
            starboard_limit: r.raw_u16(2),
            port_limit: r.raw_u16(4),
            port_limit_hit: flags & DETAIL_PORT_HIT != 0,
            starboard_limit_hit: flags & DETAIL_STARBOARD_HIT != 0,
            enabled: flags & DETAIL_ENABLED != 0,
            calibrated: flags & DETAIL_CALIBRATED != 0,
            calibrating: flags & DETAIL_CALIBRATING != 0,
        })
    }

    fn validity(&self) -> Validity {
        all_fields(8)
    }
}

impl Encode for RudderDetails {
    fn encode(&self) -> ([u8; 8], usize) {
        let flags = [
            (self.port_limit_hit, DETAIL_PORT_HIT),
            (self.starboard_limit_hit, DETAIL_STARBOARD_HIT),
            (self.enabled, DETAIL_ENABLED),
            (self.calibrated, DETAIL_CALIBRATED),
            (self.calibrating, DETAIL_CALIBRATING),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .fold(0u8, |acc, (_, bit)| acc | bit);

        let mut w = FieldWriter::new();
        w.raw_u16(0, self.pot)
            .raw_u16(2, self.starboard_limit)
            .raw_u16(4, self.port_limit)
            .raw_u8(6, flags);
        (w.finish(), Self::LEN)
    }
}

//==================================================================================RUDDER_SET_STATE
/// `0x082` – rudder actuator command. Bit 0 requests a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RudderSetState {
    pub calibrate: bool,
}

impl Decode for RudderSetState {
    const LEN: usize = 1;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            calibrate: r.raw_u8(0) & 0x01 != 0,
        })
    }

    fn validity(&self) -> Validity {
        all_fields(1)
    }
}

impl Encode for RudderSetState {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_u8(0, u8::from(self.calibrate));
        (w.finish(), Self::LEN)
    }
}

//==================================================================================RATE_COMMAND
/// `0x083` – requested transmit rates of a node's two adjustable messages.
/// Raw bytes are interpreted by [`crate::scheduler::RateRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateCommand {
    pub primary: u8,
    pub secondary: u8,
}

impl Decode for RateCommand {
    const LEN: usize = 2;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            primary: r.raw_u8(0),
            secondary: r.raw_u8(1),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(2)
    }
}

impl Encode for RateCommand {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_u8(0, self.primary).raw_u8(1, self.secondary);
        (w.finish(), Self::LEN)
    }
}

//==================================================================================IMU
/// `0x084` – attitude, radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuAttitude {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Decode for ImuAttitude {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            yaw: scaled(r.raw_i16(0), RES_ANGLE),
            pitch: scaled(r.raw_i16(2), RES_ANGLE),
            roll: scaled(r.raw_i16(4), RES_ANGLE),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(3)
    }
}

impl Encode for ImuAttitude {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_i16(0, unscaled(self.yaw, RES_ANGLE) as i16)
            .raw_i16(2, unscaled(self.pitch, RES_ANGLE) as i16)
            .raw_i16(4, unscaled(self.roll, RES_ANGLE) as i16);
        (w.finish(), Self::LEN)
    }
}

/// `0x085` – yaw rate from the standalone gyro, rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyroRate {
    pub z_rate: f32,
}

impl Decode for GyroRate {
    const LEN: usize = 2;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            z_rate: scaled(r.raw_i16(0), RES_RATE),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(1)
    }
}

impl Encode for GyroRate {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_i16(0, unscaled(self.z_rate, RES_RATE) as i16);
        (w.finish(), Self::LEN)
    }
}

/// Three signed axes sharing one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Axes {
    fn read(r: &FieldReader<'_>, resolution: f64) -> Self {
        Self {
            x: scaled(r.raw_i16(0), resolution),
            y: scaled(r.raw_i16(2), resolution),
            z: scaled(r.raw_i16(4), resolution),
        }
    }

    fn write(&self, resolution: f64) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_i16(0, unscaled(self.x, resolution) as i16)
            .raw_i16(2, unscaled(self.y, resolution) as i16)
            .raw_i16(4, unscaled(self.z, resolution) as i16);
        (w.finish(), 6)
    }
}

/// `0x086` – angular velocity, rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularVelocity(pub Axes);

impl Decode for AngularVelocity {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self(Axes::read(&r, RES_RATE)))
    }

    fn validity(&self) -> Validity {
        all_fields(3)
    }
}

impl Encode for AngularVelocity {
    fn encode(&self) -> ([u8; 8], usize) {
        self.0.write(RES_RATE)
    }
}

/// `0x087` – linear acceleration, m/s².
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration(pub Axes);

impl Decode for Acceleration {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self(Axes::read(&r, RES_ACCEL)))
    }

    fn validity(&self) -> Validity {
        all_fields(3)
    }
}

impl Encode for Acceleration {
    fn encode(&self) -> ([u8; 8], usize) {
        self.0.write(RES_ACCEL)
    }
}

/// `0x088` / `0x089` – IMU GPS position (measured or estimated), 1e-7 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImuPosition {
    pub latitude: i32,
    pub longitude: i32,
}

impl Decode for ImuPosition {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            latitude: r.raw_i32(0),
            longitude: r.raw_i32(4),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(2)
    }
}

impl Encode for ImuPosition {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_i32(0, self.latitude).raw_i32(4, self.longitude);
        (w.finish(), Self::LEN)
    }
}

/// `0x08A` – IMU GPS velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuVelocity {
    /// Track, radians.
    pub direction: f32,
    /// m/s.
    pub speed: f32,
    /// Magnetic bearing, radians.
    pub magnetic_bearing: f32,
    pub status: u16,
}

impl Decode for ImuVelocity {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            direction: scaled(r.raw_i16(0), RES_ANGLE),
            speed: scaled(r.raw_u16(2), RES_SPEED),
            magnetic_bearing: scaled(r.raw_i16(4), RES_ANGLE),
            status: r.raw_u16(6),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(4)
    }
}

impl Encode for ImuVelocity {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_i16(0, unscaled(self.direction, RES_ANGLE) as i16)
            .raw_u16(2, unscaled(self.speed, RES_SPEED) as u16)
            .raw_i16(4, unscaled(self.magnetic_bearing, RES_ANGLE) as i16)
            .raw_u16(6, self.status);
        (w.finish(), Self::LEN)
    }
}

//==================================================================================ACS300
/// Status bit of the ACS300 heartbeat set while the drive is disabled.
pub const ACS300_STATUS_DISABLED: u8 = 0x40;

/// `0x402` – ACS300 motor controller heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Acs300Heartbeat {
    pub rpm: u16,
    /// Motor current, 0.1 A.
    pub current: u16,
    /// Bus voltage, 0.1 V.
    pub voltage: u16,
    pub status: u8,
    pub fault: u8,
}

impl Acs300Heartbeat {
    pub fn drive_enabled(&self) -> bool {
        self.status & ACS300_STATUS_DISABLED == 0
    }
}

impl Decode for Acs300Heartbeat {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            rpm: r.raw_u16(0),
            current: r.raw_u16(2),
            voltage: r.raw_u16(4),
            status: r.raw_u8(6),
            fault: r.raw_u8(7),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(5)
    }
}

impl Encode for Acs300Heartbeat {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_u16(0, self.rpm)
            .raw_u16(2, self.current)
            .raw_u16(4, self.voltage)
            .raw_u8(6, self.status)
            .raw_u8(7, self.fault);
        (w.finish(), Self::LEN)
    }
}

/// `0x401` – parameter write addressed to the ACS300. The secondary
/// controller uses it to set the commanded current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Acs300WriteParam {
    pub address: u16,
    pub value: u16,
}

impl Decode for Acs300WriteParam {
    const LEN: usize = 4;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            address: r.raw_u16(0),
            value: r.raw_u16(2),
        })
    }

    fn validity(&self) -> Validity {
        all_fields(2)
    }
}

impl Encode for Acs300WriteParam {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.raw_u16(0, self.address).raw_u16(2, self.value);
        (w.finish(), Self::LEN)
    }
}
