//! NMEA 2000 single-frame PGNs consumed or produced by the control nodes.
//!
//! Each message decodes into `Option` fields (unavailable markers become
//! `None`) and reports a validity mask whose bit `n` is the `n`-th field of the
//! struct in declaration order. Values are converted to SI units (radians,
//! m/s, °C) at this boundary; positions stay in integer 1e-7 degree units.
use crate::error::DecodeError;
use crate::infra::codec::bits::{scaled, unscaled, FieldReader, FieldWriter};
use crate::infra::codec::traits::{Decode, Encode};
use crate::infra::codec::validity::Validity;

pub const PGN_SYSTEM_TIME: u32 = 126992;
pub const PGN_RUDDER: u32 = 127245;
pub const PGN_MAG_VARIATION: u32 = 127258;
pub const PGN_BATTERY_STATUS: u32 = 127508;
pub const PGN_SPEED: u32 = 128259;
pub const PGN_WATER_DEPTH: u32 = 128267;
pub const PGN_POSITION_RAPID: u32 = 129025;
pub const PGN_COG_SOG_RAPID: u32 = 129026;
pub const PGN_GNSS_DOPS: u32 = 129539;
pub const PGN_WIND_DATA: u32 = 130306;
pub const PGN_ENV_PARAMETERS: u32 = 130310;
pub const PGN_ENV_PARAMETERS2: u32 = 130311;

const RES_ANGLE: f64 = 1e-4;
const RES_SPEED: f64 = 0.01;
const RES_TEMPERATURE: f64 = 0.01;
const RES_VOLTAGE: f64 = 0.01;
const RES_CURRENT: f64 = 0.1;
const RES_DEPTH: f64 = 0.01;
const RES_DEPTH_OFFSET: f64 = 0.001;
const RES_DOP: f64 = 0.01;
const RES_HUMIDITY: f64 = 0.004;
const KELVIN_OFFSET: f32 = 273.15;

/// GNSS fix modes of PGN 129539.
pub const GNSS_MODE_1D: u8 = 0;
pub const GNSS_MODE_2D: u8 = 1;
pub const GNSS_MODE_3D: u8 = 2;

fn celsius(raw: u16) -> f32 {
    scaled(raw, RES_TEMPERATURE) - KELVIN_OFFSET
}

fn kelvin_raw(celsius: f32) -> u16 {
    unscaled(celsius + KELVIN_OFFSET, RES_TEMPERATURE) as u16
}

//==================================================================================126992
/// PGN 126992 – System Time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemTime {
    pub sid: Option<u8>,
    pub source: Option<u8>,
    /// Days since 1970-01-01.
    pub days_since_epoch: Option<u16>,
    /// Time since midnight in units of 0.1 ms.
    pub time_of_day: Option<u32>,
}

/// Calendar date derived from a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Wall-clock time derived from the time-of-day field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Proleptic Gregorian date for a day count since the Unix epoch.
pub fn civil_from_days(days: u16) -> CivilDate {
    let z = days as u32 + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + u32::from(month <= 2);
    CivilDate {
        year: year as u16,
        month,
        day,
    }
}

impl SystemTime {
    pub fn date(&self) -> Option<CivilDate> {
        self.days_since_epoch.map(civil_from_days)
    }

    pub fn clock(&self) -> Option<ClockTime> {
        self.time_of_day.map(|tenth_ms| {
            let seconds = tenth_ms / 10_000;
            ClockTime {
                hour: (seconds / 3_600) as u8,
                minute: (seconds / 60 % 60) as u8,
                second: (seconds % 60) as u8,
            }
        })
    }

    pub fn usec_since_epoch(&self) -> Option<u64> {
        let days = self.days_since_epoch? as u64;
        let tenth_ms = self.time_of_day? as u64;
        Some(days * 86_400_000_000 + tenth_ms * 100)
    }
}

impl Decode for SystemTime {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            source: r.bits(1, 0, 4),
            days_since_epoch: r.u16(2),
            time_of_day: r.u32(4),
        })
    }

    /// sid, source, year, month, day, hour, minute, second, microseconds.
    fn validity(&self) -> Validity {
        let date = self.days_since_epoch.is_some();
        let time = self.time_of_day.is_some();
        Validity::from_fields(&[
            self.sid.is_some(),
            self.source.is_some(),
            date,
            date,
            date,
            time,
            time,
            time,
            date && time,
        ])
    }
}

impl Encode for SystemTime {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .bits(1, 0, 4, self.source)
            .u16(2, self.days_since_epoch)
            .u32(4, self.time_of_day);
        (w.finish(), 8)
    }
}

//==================================================================================127245
/// PGN 127245 – Rudder. Carries either a commanded angle (autopilot) or the
/// measured position (rudder node).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rudder {
    pub instance: Option<u8>,
    pub direction_order: Option<u8>,
    /// Commanded angle, radians.
    pub angle_order: Option<f32>,
    /// Measured position, radians.
    pub position: Option<f32>,
}

impl Decode for Rudder {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            instance: r.u8(0),
            direction_order: r.bits(1, 0, 3),
            angle_order: r.i16(2).map(|v| scaled(v, RES_ANGLE)),
            position: r.i16(4).map(|v| scaled(v, RES_ANGLE)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.instance.is_some(),
            self.direction_order.is_some(),
            self.angle_order.is_some(),
            self.position.is_some(),
        ])
    }
}

impl Encode for Rudder {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.instance)
            .bits(1, 0, 3, self.direction_order)
            .i16(2, self.angle_order.map(|v| unscaled(v, RES_ANGLE) as i16))
            .i16(4, self.position.map(|v| unscaled(v, RES_ANGLE) as i16));
        (w.finish(), 8)
    }
}

//==================================================================================127258
/// PGN 127258 – Magnetic Variation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagneticVariation {
    pub sid: Option<u8>,
    pub source: Option<u8>,
    pub age_of_service: Option<u16>,
    /// Variation, radians (east positive).
    pub variation: Option<f32>,
}

impl Decode for MagneticVariation {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            source: r.bits(1, 0, 4),
            age_of_service: r.u16(2),
            variation: r.i16(4).map(|v| scaled(v, RES_ANGLE)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.source.is_some(),
            self.age_of_service.is_some(),
            self.variation.is_some(),
        ])
    }
}

impl Encode for MagneticVariation {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .bits(1, 0, 4, self.source)
            .u16(2, self.age_of_service)
            .i16(4, self.variation.map(|v| unscaled(v, RES_ANGLE) as i16));
        (w.finish(), 8)
    }
}

//==================================================================================127508
/// PGN 127508 – Battery Status.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatteryStatus {
    pub instance: Option<u8>,
    pub sid: Option<u8>,
    /// Volts.
    pub voltage: Option<f32>,
    /// Amperes.
    pub current: Option<f32>,
    /// Degrees Celsius.
    pub temperature: Option<f32>,
}

impl BatteryStatus {
    /// Voltage and current are both required for a usable reading.
    pub const FULLY_VALID: Validity = Validity::from_bits(0x0C);
}

impl Decode for BatteryStatus {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            instance: r.u8(0),
            voltage: r.i16(1).map(|v| scaled(v, RES_VOLTAGE)),
            current: r.i16(3).map(|v| scaled(v, RES_CURRENT)),
            temperature: r.u16(5).map(celsius),
            sid: r.u8(7),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.instance.is_some(),
            self.sid.is_some(),
            self.voltage.is_some(),
            self.current.is_some(),
            self.temperature.is_some(),
        ])
    }
}

impl Encode for BatteryStatus {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.instance)
            .i16(1, self.voltage.map(|v| unscaled(v, RES_VOLTAGE) as i16))
            .i16(3, self.current.map(|v| unscaled(v, RES_CURRENT) as i16))
            .u16(5, self.temperature.map(kelvin_raw))
            .u8(7, self.sid);
        (w.finish(), 8)
    }
}

//==================================================================================128259
/// PGN 128259 – Speed (water referenced).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Speed {
    pub sid: Option<u8>,
    /// m/s.
    pub water_speed: Option<f32>,
}

impl Speed {
    pub const FULLY_VALID: Validity = Validity::from_bits(0x02);
}

impl Decode for Speed {
    const LEN: usize = 3;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            water_speed: r.u16(1).map(|v| scaled(v, RES_SPEED)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[self.sid.is_some(), self.water_speed.is_some()])
    }
}

impl Encode for Speed {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .u16(1, self.water_speed.map(|v| unscaled(v, RES_SPEED) as u16));
        (w.finish(), 8)
    }
}

//==================================================================================128267
/// PGN 128267 – Water Depth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaterDepth {
    pub sid: Option<u8>,
    /// Metres below the transducer.
    pub depth: Option<f32>,
    /// Transducer offset, metres.
    pub offset: Option<f32>,
}

impl WaterDepth {
    pub const FULLY_VALID: Validity = Validity::from_bits(0x02);
}

impl Decode for WaterDepth {
    const LEN: usize = 7;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            depth: r.u32(1).map(|v| scaled(v, RES_DEPTH)),
            offset: r.i16(5).map(|v| scaled(v, RES_DEPTH_OFFSET)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.depth.is_some(),
            self.offset.is_some(),
        ])
    }
}

impl Encode for WaterDepth {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .u32(1, self.depth.map(|v| unscaled(v, RES_DEPTH) as u32))
            .i16(5, self.offset.map(|v| unscaled(v, RES_DEPTH_OFFSET) as i16));
        (w.finish(), 8)
    }
}

//==================================================================================129025
/// PGN 129025 – Position, Rapid Update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionRapid {
    /// 1e-7 degrees.
    pub latitude: Option<i32>,
    /// 1e-7 degrees.
    pub longitude: Option<i32>,
}

impl PositionRapid {
    pub const FULLY_VALID: Validity = Validity::from_bits(0x03);
}

impl Decode for PositionRapid {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            latitude: r.i32(0),
            longitude: r.i32(4),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[self.latitude.is_some(), self.longitude.is_some()])
    }
}

impl Encode for PositionRapid {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.i32(0, self.latitude).i32(4, self.longitude);
        (w.finish(), 8)
    }
}

//==================================================================================129026
/// PGN 129026 – COG & SOG, Rapid Update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CogSogRapid {
    pub sid: Option<u8>,
    pub cog_reference: Option<u8>,
    /// Course over ground, radians.
    pub cog: Option<f32>,
    /// Speed over ground, m/s.
    pub sog: Option<f32>,
}

impl CogSogRapid {
    pub const FULLY_VALID: Validity = Validity::from_bits(0x0C);
}

impl Decode for CogSogRapid {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            cog_reference: r.bits(1, 0, 2),
            cog: r.u16(2).map(|v| scaled(v, RES_ANGLE)),
            sog: r.u16(4).map(|v| scaled(v, RES_SPEED)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.cog_reference.is_some(),
            self.cog.is_some(),
            self.sog.is_some(),
        ])
    }
}

impl Encode for CogSogRapid {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .bits(1, 0, 2, self.cog_reference)
            .u16(2, self.cog.map(|v| unscaled(v, RES_ANGLE) as u16))
            .u16(4, self.sog.map(|v| unscaled(v, RES_SPEED) as u16));
        (w.finish(), 8)
    }
}

//==================================================================================129539
/// PGN 129539 – GNSS DOPs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GnssDops {
    pub sid: Option<u8>,
    pub desired_mode: Option<u8>,
    pub actual_mode: Option<u8>,
    pub hdop: Option<f32>,
    pub vdop: Option<f32>,
    pub tdop: Option<f32>,
}

impl GnssDops {
    /// Actual mode, HDOP and VDOP.
    pub const FULLY_VALID: Validity = Validity::from_bits(0x1C);
}

impl Decode for GnssDops {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            desired_mode: r.bits(1, 0, 3),
            actual_mode: r.bits(1, 3, 3),
            hdop: r.i16(2).map(|v| scaled(v, RES_DOP)),
            vdop: r.i16(4).map(|v| scaled(v, RES_DOP)),
            tdop: r.i16(6).map(|v| scaled(v, RES_DOP)),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.desired_mode.is_some(),
            self.actual_mode.is_some(),
            self.hdop.is_some(),
            self.vdop.is_some(),
            self.tdop.is_some(),
        ])
    }
}

impl Encode for GnssDops {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .bits(1, 0, 3, self.desired_mode)
            .bits(1, 3, 3, self.actual_mode)
            .i16(2, self.hdop.map(|v| unscaled(v, RES_DOP) as i16))
            .i16(4, self.vdop.map(|v| unscaled(v, RES_DOP) as i16))
            .i16(6, self.tdop.map(|v| unscaled(v, RES_DOP) as i16));
        (w.finish(), 8)
    }
}

//==================================================================================130306
/// PGN 130306 – Wind Data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindData {
    pub sid: Option<u8>,
    /// m/s.
    pub speed: Option<f32>,
    /// Radians.
    pub direction: Option<f32>,
    pub reference: Option<u8>,
}

impl WindData {
    pub const FULLY_VALID: Validity = Validity::from_bits(0x06);
}

impl Decode for WindData {
    const LEN: usize = 6;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            speed: r.u16(1).map(|v| scaled(v, RES_SPEED)),
            direction: r.u16(3).map(|v| scaled(v, RES_ANGLE)),
            reference: r.bits(5, 0, 3),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.speed.is_some(),
            self.direction.is_some(),
            self.reference.is_some(),
        ])
    }
}

impl Encode for WindData {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .u16(1, self.speed.map(|v| unscaled(v, RES_SPEED) as u16))
            .u16(3, self.direction.map(|v| unscaled(v, RES_ANGLE) as u16))
            .bits(5, 0, 3, self.reference);
        (w.finish(), 8)
    }
}

//==================================================================================130310
/// PGN 130310 – Environmental Parameters (water/air temperature, pressure).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvironmentalParameters {
    pub sid: Option<u8>,
    /// °C.
    pub water_temperature: Option<f32>,
    /// °C.
    pub air_temperature: Option<f32>,
    /// hPa.
    pub pressure: Option<u16>,
}

impl Decode for EnvironmentalParameters {
    const LEN: usize = 7;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            water_temperature: r.u16(1).map(celsius),
            air_temperature: r.u16(3).map(celsius),
            pressure: r.u16(5),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.water_temperature.is_some(),
            self.air_temperature.is_some(),
            self.pressure.is_some(),
        ])
    }
}

impl Encode for EnvironmentalParameters {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .u16(1, self.water_temperature.map(kelvin_raw))
            .u16(3, self.air_temperature.map(kelvin_raw))
            .u16(5, self.pressure);
        (w.finish(), 8)
    }
}

//==================================================================================130311
/// PGN 130311 – Environmental Parameters 2 (temperature, humidity, pressure).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvironmentalParameters2 {
    pub sid: Option<u8>,
    pub temperature_instance: Option<u8>,
    pub humidity_instance: Option<u8>,
    /// °C.
    pub temperature: Option<f32>,
    /// Percent.
    pub humidity: Option<f32>,
    /// hPa.
    pub pressure: Option<u16>,
}

/// Temperature instance for readings taken inside an enclosure.
pub const TEMPERATURE_INSTANCE_INSIDE: u8 = 2;

impl EnvironmentalParameters2 {
    /// Temperature alone makes the reading usable.
    pub const FULLY_VALID: Validity = Validity::from_bits(0x08);
}

impl Decode for EnvironmentalParameters2 {
    const LEN: usize = 8;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let r = FieldReader::new(payload, Self::LEN)?;
        Ok(Self {
            sid: r.u8(0),
            temperature_instance: r.bits(1, 0, 6),
            humidity_instance: r.bits(1, 6, 2),
            temperature: r.u16(2).map(celsius),
            humidity: r.i16(4).map(|v| scaled(v, RES_HUMIDITY)),
            pressure: r.u16(6),
        })
    }

    fn validity(&self) -> Validity {
        Validity::from_fields(&[
            self.sid.is_some(),
            self.temperature_instance.is_some(),
            self.humidity_instance.is_some(),
            self.temperature.is_some(),
            self.humidity.is_some(),
            self.pressure.is_some(),
        ])
    }
}

impl Encode for EnvironmentalParameters2 {
    fn encode(&self) -> ([u8; 8], usize) {
        let mut w = FieldWriter::new();
        w.u8(0, self.sid)
            .raw_u8(1, 0)
            .bits(1, 0, 6, self.temperature_instance)
            .bits(1, 6, 2, self.humidity_instance)
            .u16(2, self.temperature.map(kelvin_raw))
            .i16(4, self.humidity.map(|v| unscaled(v, RES_HUMIDITY) as i16))
            .u16(6, self.pressure);
        (w.finish(), 8)
    }
}
