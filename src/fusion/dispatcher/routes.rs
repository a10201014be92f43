//! Route tables of the primary node: which handler decodes each identifier,
//! which sensor the frame is evidence for, and when it also counts as
//! evidence of usable data.
//!
//! Handlers commit the present fields of their message to the data store and
//! raise the reading's new-data flag when the update is usable. Liveness is
//! left to the dispatcher, which applies the route's [`Evidence`] rule.
use crate::error::DecodeError;
use crate::fusion::availability::Sensor;
use crate::fusion::gps_bundle::BundleEvent;
use crate::fusion::FusionContext;
use crate::infra::codec::traits::Decode;
use crate::infra::codec::validity::Validity;
use crate::protocol::messages::n2k::{
    self, BatteryStatus, CogSogRapid, EnvironmentalParameters, EnvironmentalParameters2,
    GnssDops, MagneticVariation, PositionRapid, Rudder, Speed, SystemTime, WaterDepth, WindData,
};
use crate::protocol::messages::proprietary::{
    ids, Acceleration, Acs300Heartbeat, Acs300WriteParam, AngularVelocity, GyroRate,
    ImuAttitude, ImuPosition, ImuVelocity, NodeStatusMsg, RudderDetails, ACS300_PARAM_CC,
};

/// Decodes a payload and commits it. Returns the validity mask of the decode.
pub type Handler = fn(&mut FusionContext, &[u8]) -> Result<Validity, DecodeError>;

/// When a parsed frame also resets the `active` counter of its sensor.
#[derive(Clone, Copy)]
pub enum Evidence {
    /// Never from the dispatcher (the sensor is only enabled, or its active
    /// evidence comes from elsewhere).
    Never,
    Always,
    /// Every bit of the mask is valid.
    AllValid(Validity),
    /// Predicate over the state right after the commit.
    When(fn(&FusionContext) -> bool),
}

#[derive(Clone, Copy)]
pub struct Route {
    pub handler: Handler,
    pub sensor: Option<Sensor>,
    pub active: Evidence,
}

const fn route(handler: Handler, sensor: Option<Sensor>, active: Evidence) -> Route {
    Route {
        handler,
        sensor,
        active,
    }
}

//==================================================================================TABLES
/// Standard (proprietary) identifiers.
pub static SHORT_ROUTES: [(u16, Route); 11] = [
    (
        ids::ACS300_HEARTBEAT,
        route(
            acs300_heartbeat,
            Some(Sensor::Propulsion),
            Evidence::When(drive_enabled),
        ),
    ),
    (
        ids::ACS300_WR_PARAM,
        route(acs300_write_param, None, Evidence::Never),
    ),
    (ids::STATUS, route(node_status, None, Evidence::Never)),
    (
        ids::RUDDER_DETAILS,
        route(
            rudder_details,
            Some(Sensor::Rudder),
            Evidence::When(rudder_ready),
        ),
    ),
    (
        ids::IMU_DATA,
        route(imu_attitude, Some(Sensor::Imu), Evidence::Always),
    ),
    (
        ids::GYRO_DATA,
        route(gyro_rate, Some(Sensor::Gyro), Evidence::Always),
    ),
    (
        ids::ANG_VEL_DATA,
        route(angular_velocity, Some(Sensor::Imu), Evidence::Always),
    ),
    (
        ids::ACCEL_DATA,
        route(acceleration, Some(Sensor::Imu), Evidence::Always),
    ),
    (
        ids::GPS_POS_DATA,
        route(imu_position, Some(Sensor::Imu), Evidence::Always),
    ),
    (
        ids::GPS_EST_POS_DATA,
        route(imu_estimated_position, Some(Sensor::Imu), Evidence::Always),
    ),
    (
        ids::GPS_VEL_DATA,
        route(imu_velocity, Some(Sensor::Imu), Evidence::Always),
    ),
];

/// Year, month, day, hour, minute and second all decoded.
const DATE_TIME_VALID: Validity = Validity::from_bits(0xFC);

/// NMEA 2000 PGNs.
pub static LONG_ROUTES: [(u32, Route); 12] = [
    (
        n2k::PGN_SYSTEM_TIME,
        route(
            system_time,
            Some(Sensor::Gps),
            Evidence::AllValid(DATE_TIME_VALID),
        ),
    ),
    (n2k::PGN_RUDDER, route(rudder, None, Evidence::Never)),
    (
        n2k::PGN_MAG_VARIATION,
        route(magnetic_variation, None, Evidence::Never),
    ),
    (
        n2k::PGN_BATTERY_STATUS,
        route(
            battery_status,
            Some(Sensor::Power),
            Evidence::AllValid(BatteryStatus::FULLY_VALID),
        ),
    ),
    (
        n2k::PGN_SPEED,
        route(
            water_speed,
            Some(Sensor::DepthSounder),
            Evidence::AllValid(Speed::FULLY_VALID),
        ),
    ),
    (
        n2k::PGN_WATER_DEPTH,
        route(
            water_depth,
            Some(Sensor::DepthSounder),
            Evidence::AllValid(WaterDepth::FULLY_VALID),
        ),
    ),
    (
        n2k::PGN_POSITION_RAPID,
        route(position_rapid, Some(Sensor::Gps), Evidence::Never),
    ),
    (
        n2k::PGN_COG_SOG_RAPID,
        route(cog_sog_rapid, Some(Sensor::Gps), Evidence::Never),
    ),
    (
        n2k::PGN_GNSS_DOPS,
        route(gnss_dops, Some(Sensor::Gps), Evidence::Never),
    ),
    (
        n2k::PGN_WIND_DATA,
        route(
            wind_data,
            Some(Sensor::WindStation),
            Evidence::AllValid(WindData::FULLY_VALID),
        ),
    ),
    // The depth sounder is only active on actual depth readings.
    (
        n2k::PGN_ENV_PARAMETERS,
        route(
            water_temperature,
            Some(Sensor::DepthSounder),
            Evidence::Never,
        ),
    ),
    (
        n2k::PGN_ENV_PARAMETERS2,
        route(
            air_parameters,
            Some(Sensor::WindStation),
            Evidence::AllValid(EnvironmentalParameters2::FULLY_VALID),
        ),
    ),
];

pub fn short_route(id: u16) -> Option<&'static Route> {
    SHORT_ROUTES
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, route)| route)
}

pub fn long_route(pgn: u32) -> Option<&'static Route> {
    LONG_ROUTES
        .iter()
        .find(|(key, _)| *key == pgn)
        .map(|(_, route)| route)
}

//==================================================================================PREDICATES
fn drive_enabled(ctx: &FusionContext) -> bool {
    ctx.store.throttle.peek().value.drive_enabled
}

fn rudder_ready(ctx: &FusionContext) -> bool {
    let rudder = ctx.store.rudder.peek().value;
    rudder.enabled && rudder.calibrated && !rudder.calibrating
}

//==================================================================================PROPRIETARY
fn acs300_heartbeat(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = Acs300Heartbeat::decode(payload)?;
    let throttle = ctx.store.throttle.value_mut();
    throttle.rpm = msg.rpm;
    throttle.drive_enabled = msg.drive_enabled();
    ctx.store.throttle.publish();
    Ok(msg.validity())
}

fn acs300_write_param(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = Acs300WriteParam::decode(payload)?;
    if msg.address == ACS300_PARAM_CC {
        ctx.store.commands.secondary_manual_throttle = msg.value as i16;
    }
    Ok(msg.validity())
}

/// RC node liveness rides on its status message: any status enables it, the
/// override bit makes it active.
fn node_status(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = NodeStatusMsg::decode(payload)?;
    if ctx.nodes.update(&msg) && msg.node == crate::config::node_ids::RC {
        ctx.availability.reset_enabled(Sensor::RcNode);
        if msg.status & 0x01 != 0 {
            ctx.availability.reset_active(Sensor::RcNode);
        }
    }
    Ok(msg.validity())
}

fn rudder_details(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = RudderDetails::decode(payload)?;
    let rudder = ctx.store.rudder.value_mut();
    rudder.pot = msg.pot;
    rudder.starboard_limit = msg.starboard_limit;
    rudder.port_limit = msg.port_limit;
    rudder.port_limit_hit = msg.port_limit_hit;
    rudder.starboard_limit_hit = msg.starboard_limit_hit;
    rudder.enabled = msg.enabled;
    rudder.calibrated = msg.calibrated;
    rudder.calibrating = msg.calibrating;
    ctx.store.rudder.publish();
    Ok(msg.validity())
}

fn imu_attitude(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = ImuAttitude::decode(payload)?;
    let imu = ctx.store.inertial.value_mut();
    imu.yaw = msg.yaw;
    imu.pitch = msg.pitch;
    imu.roll = msg.roll;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

fn gyro_rate(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = GyroRate::decode(payload)?;
    ctx.store.gyro.value_mut().z_rate = msg.z_rate;
    ctx.store.gyro.publish();
    Ok(msg.validity())
}

fn angular_velocity(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = AngularVelocity::decode(payload)?;
    let axes = msg.0;
    let imu = ctx.store.inertial.value_mut();
    imu.x_angle_vel = axes.x;
    imu.y_angle_vel = axes.y;
    imu.z_angle_vel = axes.z;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

fn acceleration(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = Acceleration::decode(payload)?;
    let axes = msg.0;
    let imu = ctx.store.inertial.value_mut();
    imu.x_accel = axes.x;
    imu.y_accel = axes.y;
    imu.z_accel = axes.z;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

fn imu_position(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = ImuPosition::decode(payload)?;
    let imu = ctx.store.inertial.value_mut();
    imu.latitude = msg.latitude;
    imu.longitude = msg.longitude;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

fn imu_estimated_position(
    ctx: &mut FusionContext,
    payload: &[u8],
) -> Result<Validity, DecodeError> {
    let msg = ImuPosition::decode(payload)?;
    let imu = ctx.store.inertial.value_mut();
    imu.est_latitude = msg.latitude;
    imu.est_longitude = msg.longitude;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

fn imu_velocity(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = ImuVelocity::decode(payload)?;
    let imu = ctx.store.inertial.value_mut();
    imu.gps_direction = msg.direction;
    imu.gps_speed = msg.speed;
    imu.magnetic_bearing = msg.magnetic_bearing;
    imu.status = msg.status;
    ctx.store.inertial.publish();
    Ok(msg.validity())
}

//==================================================================================N2K
fn system_time(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = SystemTime::decode(payload)?;
    let validity = msg.validity();
    let date_time = ctx.store.date_time.value_mut();
    if let Some(date) = msg.date() {
        date_time.year = date.year;
        date_time.month = date.month;
        date_time.day = date.day;
    }
    if let Some(clock) = msg.clock() {
        date_time.hour = clock.hour;
        date_time.minute = clock.minute;
        date_time.second = clock.second;
    }
    if let Some(usec) = msg.usec_since_epoch() {
        date_time.usec_since_epoch = usec;
    }
    if validity.contains(DATE_TIME_VALID) {
        ctx.store.date_time.publish();
    }
    Ok(validity)
}

/// Either a commanded angle from the secondary controller or the measured
/// angle from the rudder node; both are tracked.
fn rudder(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = Rudder::decode(payload)?;
    if let Some(angle) = msg.angle_order {
        ctx.store.commands.secondary_manual_rudder = angle;
    }
    if let Some(angle) = msg.position {
        ctx.store.rudder.value_mut().angle = angle;
    }
    Ok(msg.validity())
}

fn magnetic_variation(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = MagneticVariation::decode(payload)?;
    if let Some(variation) = msg.variation {
        ctx.store.gps.value_mut().variation = variation;
    }
    Ok(msg.validity())
}

fn battery_status(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = BatteryStatus::decode(payload)?;
    let validity = msg.validity();
    let power = ctx.store.power.value_mut();
    if let Some(voltage) = msg.voltage {
        power.voltage = voltage;
    }
    if let Some(current) = msg.current {
        power.current = current;
    }
    if let Some(temperature) = msg.temperature {
        power.temperature = temperature;
    }
    if validity.contains(BatteryStatus::FULLY_VALID) {
        ctx.store.power.publish();
    }
    Ok(validity)
}

fn water_speed(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = Speed::decode(payload)?;
    if let Some(speed) = msg.water_speed {
        ctx.store.water.value_mut().speed = speed;
        ctx.store.water.publish();
    }
    Ok(msg.validity())
}

fn water_depth(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = WaterDepth::decode(payload)?;
    if let Some(depth) = msg.depth {
        ctx.store.water.value_mut().depth = depth;
        ctx.store.water.publish();
    }
    Ok(msg.validity())
}

fn water_temperature(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = EnvironmentalParameters::decode(payload)?;
    if let Some(temperature) = msg.water_temperature {
        ctx.store.water.value_mut().temperature = temperature;
        ctx.store.water.publish();
    }
    Ok(msg.validity())
}

fn wind_data(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = WindData::decode(payload)?;
    let validity = msg.validity();
    let wind = ctx.store.wind.value_mut();
    if let Some(speed) = msg.speed {
        wind.speed = speed;
    }
    if let Some(direction) = msg.direction {
        wind.direction = direction;
    }
    if validity.contains(WindData::FULLY_VALID) {
        ctx.store.wind.publish();
    }
    Ok(validity)
}

fn air_parameters(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = EnvironmentalParameters2::decode(payload)?;
    let validity = msg.validity();
    let air = ctx.store.air.value_mut();
    if let Some(temperature) = msg.temperature {
        air.temperature = temperature;
    }
    if let Some(humidity) = msg.humidity {
        air.humidity = humidity;
    }
    if let Some(pressure) = msg.pressure {
        air.pressure = pressure;
    }
    if validity.contains(EnvironmentalParameters2::FULLY_VALID) {
        ctx.store.air.publish();
    }
    Ok(validity)
}

//==================================================================================GPS_BUNDLE
fn position_rapid(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = PositionRapid::decode(payload)?;
    if let (Some(latitude), Some(longitude)) = (msg.latitude, msg.longitude) {
        let event = ctx.gps.position(latitude, longitude);
        settle_bundle(ctx, event);
    }
    Ok(msg.validity())
}

fn cog_sog_rapid(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = CogSogRapid::decode(payload)?;
    if let (Some(cog), Some(sog)) = (msg.cog, msg.sog) {
        let event = ctx.gps.course_speed(cog, sog);
        settle_bundle(ctx, event);
    }
    Ok(msg.validity())
}

fn gnss_dops(ctx: &mut FusionContext, payload: &[u8]) -> Result<Validity, DecodeError> {
    let msg = GnssDops::decode(payload)?;
    if let (Some(mode), Some(hdop), Some(vdop)) = (msg.actual_mode, msg.hdop, msg.vdop) {
        let event = ctx.gps.fix_quality(mode, hdop, vdop);
        settle_bundle(ctx, event);
    }
    Ok(msg.validity())
}

/// Publish an accepted fix as one update and mark the GPS active.
fn settle_bundle(ctx: &mut FusionContext, event: BundleEvent) {
    if let BundleEvent::Accepted(fix) = event {
        fix.apply_to(ctx.store.gps.value_mut());
        ctx.store.gps.publish();
        ctx.availability.reset_active(Sensor::Gps);
    }
}
