//! Routing, field commits and liveness evidence of the dispatcher.
use super::*;
use crate::config::{node_ids, FusionConfig};
use crate::fusion::availability::Sensor;
use crate::infra::codec::traits::Encode;
use crate::protocol::messages::n2k::*;
use crate::protocol::messages::proprietary::{
    ids, Acs300Heartbeat, Acs300WriteParam, NodeStatusMsg, RudderDetails, ACS300_PARAM_CC,
};
use crate::protocol::transport::can_id::CanId;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embedded_can::{ExtendedId, StandardId};

const TIMEOUT: u16 = 10;

fn context() -> FusionContext {
    FusionContext::new(
        FusionConfig::new(node_ids::PRIMARY_CONTROLLER)
            .with_sensor_timeout(TIMEOUT)
            .with_node_timeout(TIMEOUT),
    )
}

fn long_frame(pgn: u32, source: u8, msg: &impl Encode) -> CanFrame {
    let id = CanId::builder(pgn, source).build().unwrap();
    let (payload, len) = msg.encode();
    CanFrame::extended(ExtendedId::try_from(id).unwrap(), &payload[..len])
}

fn short_frame(id: u16, msg: &impl Encode) -> CanFrame {
    let (payload, len) = msg.encode();
    CanFrame::standard(StandardId::new(id).unwrap(), &payload[..len])
}

fn enabled_reset(ctx: &FusionContext, sensor: Sensor) -> bool {
    ctx.availability.state(sensor).enabled.counter == 0
}

fn active_reset(ctx: &FusionContext, sensor: Sensor) -> bool {
    ctx.availability.state(sensor).active.counter == 0
}

//==================================================================================FIELD_COMMITS
#[test]
/// Fields with an unset validity bit keep their previous value.
fn test_invalid_fields_are_not_committed() {
    let mut ctx = context();
    ctx.store.power.value_mut().current = -7.0;

    let partial = BatteryStatus {
        voltage: Some(12.5),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_BATTERY_STATUS, 40, &partial)));

    let power = ctx.store.get_power();
    assert!(!power.new_data);
    assert!(power.value.voltage > 12.49 && power.value.voltage < 12.51);
    assert_eq!(power.value.current, -7.0);
    assert!(enabled_reset(&ctx, Sensor::Power));
    assert!(!active_reset(&ctx, Sensor::Power));
}

#[test]
/// Voltage and current together make the power reading fresh and active.
fn test_fully_valid_battery_is_published() {
    let mut ctx = context();
    let full = BatteryStatus {
        voltage: Some(12.5),
        current: Some(4.0),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_BATTERY_STATUS, 40, &full));
    assert!(ctx.store.get_power().new_data);
    assert!(active_reset(&ctx, Sensor::Power));

    ctx.tick();
    assert!(ctx.availability.is_enabled(Sensor::Power));
    assert!(ctx.availability.is_active(Sensor::Power));
}

#[test]
/// Water speed updates the depth sounder; the temperature PGN only enables it.
fn test_depth_sounder_evidence() {
    let mut ctx = context();
    let temperature = EnvironmentalParameters {
        water_temperature: Some(18.0),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_ENV_PARAMETERS, 35, &temperature));
    assert!(enabled_reset(&ctx, Sensor::DepthSounder));
    assert!(!active_reset(&ctx, Sensor::DepthSounder));
    assert!(ctx.store.water.peek().new_data);

    let speed = Speed {
        sid: None,
        water_speed: Some(3.1),
    };
    dispatch(&mut ctx, &long_frame(PGN_SPEED, 35, &speed));
    assert!(active_reset(&ctx, Sensor::DepthSounder));
    let speed = ctx.store.water_speed();
    assert!(speed > 3.09 && speed < 3.11);
}

#[test]
/// A date without a time of day is committed but not published.
fn test_partial_system_time() {
    let mut ctx = context();
    let time = SystemTime {
        days_since_epoch: Some(20_088),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_SYSTEM_TIME, 35, &time));
    let sample = ctx.store.get_date_time();
    assert!(!sample.new_data);
    assert_eq!((sample.value.year, sample.value.month, sample.value.day), (2024, 12, 31));
    assert!(enabled_reset(&ctx, Sensor::Gps));
    assert!(!active_reset(&ctx, Sensor::Gps));

    let time = SystemTime {
        days_since_epoch: Some(20_088),
        time_of_day: Some(3_600 * 10_000),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_SYSTEM_TIME, 35, &time));
    let sample = ctx.store.get_date_time();
    assert!(sample.new_data);
    assert_eq!(sample.value.hour, 1);
    assert!(active_reset(&ctx, Sensor::Gps));
}

#[test]
/// Wind speed without a direction keeps the last direction and stays unpublished.
fn test_partial_wind_keeps_direction() {
    let mut ctx = context();
    ctx.store.wind.value_mut().direction = 9.0;
    let wind = WindData {
        speed: Some(5.0),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_WIND_DATA, 35, &wind)));

    let sample = ctx.store.get_wind();
    assert!(!sample.new_data);
    assert!(sample.value.speed > 4.99 && sample.value.speed < 5.01);
    assert_eq!(sample.value.direction, 9.0);
    assert!(enabled_reset(&ctx, Sensor::WindStation));
    assert!(!active_reset(&ctx, Sensor::WindStation));
}

#[test]
/// Humidity alone does not replace the air temperature.
fn test_partial_air_parameters() {
    let mut ctx = context();
    ctx.store.air.value_mut().temperature = 21.5;
    let air = EnvironmentalParameters2 {
        humidity: Some(55.0),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_ENV_PARAMETERS2, 35, &air)));

    let sample = ctx.store.get_air();
    assert!(!sample.new_data);
    assert_eq!(sample.value.temperature, 21.5);
    assert!(sample.value.humidity > 54.9 && sample.value.humidity < 55.1);
    assert!(enabled_reset(&ctx, Sensor::WindStation));
    assert!(!active_reset(&ctx, Sensor::WindStation));
}

#[test]
/// A depth frame without a depth only enables the sounder.
fn test_missing_depth_is_not_committed() {
    let mut ctx = context();
    ctx.store.water.value_mut().depth = 4.0;
    let depth = WaterDepth {
        sid: Some(1),
        offset: Some(0.5),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_WATER_DEPTH, 35, &depth)));

    let sample = ctx.store.get_water();
    assert!(!sample.new_data);
    assert_eq!(sample.value.depth, 4.0);
    assert!(enabled_reset(&ctx, Sensor::DepthSounder));
    assert!(!active_reset(&ctx, Sensor::DepthSounder));
}

#[test]
/// A variation frame without a variation leaves the stored value alone.
fn test_missing_variation_is_not_committed() {
    let mut ctx = context();
    ctx.store.gps.value_mut().variation = 0.05;
    let variation = MagneticVariation {
        sid: Some(1),
        age_of_service: Some(20_000),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_MAG_VARIATION, 35, &variation)));

    let gps = ctx.store.get_gps();
    assert!(!gps.new_data);
    assert_eq!(gps.value.variation, 0.05);
}

#[test]
/// Commanded angle and measured angle land in different places.
fn test_rudder_pgn_tracks_command_and_angle() {
    let mut ctx = context();
    let command = Rudder {
        angle_order: Some(0.2),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_RUDDER, 60, &command));
    let measured = Rudder {
        position: Some(-0.3),
        ..Default::default()
    };
    dispatch(&mut ctx, &long_frame(PGN_RUDDER, node_ids::RUDDER_CONTROLLER, &measured));

    let rudder_cmd = ctx.store.commands().secondary_manual_rudder;
    assert!(rudder_cmd > 0.199 && rudder_cmd < 0.201);
    let angle = ctx.store.rudder.peek().value.angle;
    assert!(angle > -0.301 && angle < -0.299);
}

//==================================================================================ROUTING
#[test]
/// Routing depends on the PGN only, not on priority or source address.
fn test_routing_ignores_source_and_priority() {
    let mut ctx = context();
    let wind = WindData {
        speed: Some(5.0),
        direction: Some(1.0),
        ..Default::default()
    };
    let (payload, len) = wind.encode();
    for (source, priority) in [(10u8, 2u8), (200, 6), (1, 7)] {
        let id = CanId::builder(PGN_WIND_DATA, source)
            .with_priority(priority)
            .build()
            .unwrap();
        let frame = CanFrame::extended(ExtendedId::try_from(id).unwrap(), &payload[..len]);
        assert!(dispatch(&mut ctx, &frame));
        assert!(ctx.store.get_wind().new_data);
    }
}

#[test]
fn test_unknown_identifiers_are_ignored() {
    let mut ctx = context();
    let unknown_pgn = long_frame(127250, 10, &Speed::default());
    let unknown_id = CanFrame::standard(StandardId::new(0x7F0).unwrap(), &[1, 2, 3]);
    assert!(!dispatch(&mut ctx, &unknown_pgn));
    assert!(!dispatch(&mut ctx, &unknown_id));
    for sensor in Sensor::ALL {
        assert!(!enabled_reset(&ctx, sensor));
    }
}

#[test]
/// A payload too short for its layout is not evidence of anything.
fn test_short_payload_is_dropped() {
    let mut ctx = context();
    let id = CanId::builder(PGN_BATTERY_STATUS, 40).build().unwrap();
    let frame = CanFrame::extended(ExtendedId::try_from(id).unwrap(), &[1, 2, 3]);
    assert!(!dispatch(&mut ctx, &frame));
    assert!(!enabled_reset(&ctx, Sensor::Power));
}

#[test]
/// Every queued frame is consumed in one call.
fn test_process_all_drains_queue() {
    let mut ctx = context();
    let channel: Channel<NoopRawMutex, CanFrame, 8> = Channel::new();
    let speed = Speed {
        sid: None,
        water_speed: Some(1.0),
    };
    for _ in 0..3 {
        channel.try_send(long_frame(PGN_SPEED, 35, &speed)).unwrap();
    }
    channel
        .try_send(CanFrame::standard(StandardId::new(0x7F0).unwrap(), &[]))
        .unwrap();

    let mut source = &channel;
    assert_eq!(process_all(&mut ctx, &mut source), 4);
    assert!(channel.is_empty());
    assert_eq!(process_all(&mut ctx, &mut source), 0);
}

//==================================================================================GPS_BUNDLE
fn gps_cluster(latitude: i32, mode: u8) -> [CanFrame; 3] {
    let position = PositionRapid {
        latitude: Some(latitude),
        longitude: Some(-31_234_000),
    };
    let cog_sog = CogSogRapid {
        cog: Some(1.0),
        sog: Some(2.5),
        ..Default::default()
    };
    let dops = GnssDops {
        actual_mode: Some(mode),
        hdop: Some(0.8),
        vdop: Some(1.1),
        ..Default::default()
    };
    [
        long_frame(PGN_POSITION_RAPID, 12, &position),
        long_frame(PGN_COG_SOG_RAPID, 12, &cog_sog),
        long_frame(PGN_GNSS_DOPS, 12, &dops),
    ]
}

#[test]
/// Position, course/speed then a 3D fix commits one fix with new data.
fn test_gps_bundle_commits_fix() {
    let mut ctx = context();
    ctx.store.gps.value_mut().variation = 0.05;
    let [position, cog_sog, dops] = gps_cluster(476_442_500, GNSS_MODE_3D);

    dispatch(&mut ctx, &position);
    dispatch(&mut ctx, &cog_sog);
    assert!(!ctx.store.gps.peek().new_data);
    assert!(enabled_reset(&ctx, Sensor::Gps));
    assert!(!active_reset(&ctx, Sensor::Gps));

    dispatch(&mut ctx, &dops);
    let gps = ctx.store.get_gps();
    assert!(gps.new_data);
    assert_eq!(gps.value.latitude, 476_442_500);
    assert_eq!(gps.value.mode, GNSS_MODE_3D);
    assert_eq!(gps.value.variation, 0.05);
    assert!(active_reset(&ctx, Sensor::Gps));
    assert!(ctx.gps.state().is_empty());
}

#[test]
/// A second position before completion restarts the bundle.
fn test_gps_repeated_position_restarts_bundle() {
    let mut ctx = context();
    let [position, cog_sog, _] = gps_cluster(476_442_500, GNSS_MODE_3D);
    dispatch(&mut ctx, &position);
    dispatch(&mut ctx, &cog_sog);
    dispatch(&mut ctx, &position);
    assert_eq!(ctx.gps.state().mask(), 0b001);
    assert!(!ctx.store.gps.peek().new_data);
}

#[test]
/// GPS frames missing a required field enable the GPS but never touch the
/// bundle.
fn test_incomplete_gps_frames_leave_bundle_untouched() {
    let mut ctx = context();
    let position = PositionRapid {
        latitude: Some(476_442_500),
        longitude: None,
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_POSITION_RAPID, 12, &position)));
    assert!(ctx.gps.state().is_empty());
    assert!(enabled_reset(&ctx, Sensor::Gps));

    let [position, _, _] = gps_cluster(476_442_500, GNSS_MODE_3D);
    dispatch(&mut ctx, &position);
    assert_eq!(ctx.gps.state().mask(), 0b001);

    let cog_sog = CogSogRapid {
        cog: Some(1.0),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_COG_SOG_RAPID, 12, &cog_sog)));
    assert_eq!(ctx.gps.state().mask(), 0b001);

    let dops = GnssDops {
        actual_mode: Some(GNSS_MODE_3D),
        hdop: Some(0.8),
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &long_frame(PGN_GNSS_DOPS, 12, &dops)));
    assert_eq!(ctx.gps.state().mask(), 0b001);

    assert!(!ctx.store.gps.peek().new_data);
    assert_eq!(ctx.store.gps.peek().value.latitude, 0);
    assert!(!active_reset(&ctx, Sensor::Gps));
}

#[test]
/// A complete bundle without a usable fix is dropped silently.
fn test_gps_bundle_without_fix_is_discarded() {
    let mut ctx = context();
    for frame in gps_cluster(476_442_500, GNSS_MODE_1D) {
        dispatch(&mut ctx, &frame);
    }
    assert!(!ctx.store.gps.peek().new_data);
    assert_eq!(ctx.store.gps.peek().value.latitude, 0);
    assert!(!active_reset(&ctx, Sensor::Gps));
    assert!(ctx.gps.state().is_empty());
}

//==================================================================================PROPRIETARY
#[test]
/// Any RC status enables the RC node; only the override bit activates it.
fn test_rc_node_status() {
    let mut ctx = context();
    let mut status = NodeStatusMsg {
        node: node_ids::RC,
        load: 12,
        temperature: 30,
        voltage: 50,
        status: 0,
        errors: 0,
    };
    dispatch(&mut ctx, &short_frame(ids::STATUS, &status));
    assert!(enabled_reset(&ctx, Sensor::RcNode));
    assert!(!active_reset(&ctx, Sensor::RcNode));
    assert_eq!(ctx.nodes.get(node_ids::RC).unwrap().load, 12);

    status.status = 0x01;
    dispatch(&mut ctx, &short_frame(ids::STATUS, &status));
    assert!(active_reset(&ctx, Sensor::RcNode));
}

#[test]
/// Other nodes update the table without touching sensor liveness.
fn test_other_node_status() {
    let mut ctx = context();
    let status = NodeStatusMsg {
        node: node_ids::POWER,
        status: 0x01,
        ..Default::default()
    };
    assert!(dispatch(&mut ctx, &short_frame(ids::STATUS, &status)));
    assert!(ctx.nodes.is_online(node_ids::POWER));
    assert!(!enabled_reset(&ctx, Sensor::RcNode));
}

#[test]
/// The rudder is active only when enabled, calibrated and not calibrating.
fn test_rudder_details_evidence() {
    let mut ctx = context();
    let mut details = RudderDetails {
        pot: 1_000,
        enabled: true,
        calibrated: true,
        calibrating: true,
        ..Default::default()
    };
    dispatch(&mut ctx, &short_frame(ids::RUDDER_DETAILS, &details));
    assert!(enabled_reset(&ctx, Sensor::Rudder));
    assert!(!active_reset(&ctx, Sensor::Rudder));
    assert_eq!(ctx.store.rudder.peek().value.pot, 1_000);

    details.calibrating = false;
    dispatch(&mut ctx, &short_frame(ids::RUDDER_DETAILS, &details));
    assert!(active_reset(&ctx, Sensor::Rudder));
}

#[test]
/// A disabled drive is enabled but not active; its rpm is still tracked.
fn test_acs300_heartbeat_evidence() {
    let mut ctx = context();
    let heartbeat = Acs300Heartbeat {
        rpm: 750,
        status: 0x40,
        ..Default::default()
    };
    dispatch(&mut ctx, &short_frame(ids::ACS300_HEARTBEAT, &heartbeat));
    assert!(enabled_reset(&ctx, Sensor::Propulsion));
    assert!(!active_reset(&ctx, Sensor::Propulsion));
    assert_eq!(ctx.store.prop_speed(), 750);

    let heartbeat = Acs300Heartbeat {
        status: 0x00,
        ..heartbeat
    };
    dispatch(&mut ctx, &short_frame(ids::ACS300_HEARTBEAT, &heartbeat));
    assert!(active_reset(&ctx, Sensor::Propulsion));
}

#[test]
/// Only the commanded-current parameter is tracked.
fn test_acs300_write_param_command() {
    let mut ctx = context();
    let other = Acs300WriteParam {
        address: 0x10,
        value: 99,
    };
    dispatch(&mut ctx, &short_frame(ids::ACS300_WR_PARAM, &other));
    assert_eq!(ctx.store.commands().secondary_manual_throttle, 0);

    let throttle = Acs300WriteParam {
        address: ACS300_PARAM_CC,
        value: (-300i16) as u16,
    };
    dispatch(&mut ctx, &short_frame(ids::ACS300_WR_PARAM, &throttle));
    assert_eq!(ctx.store.commands().secondary_manual_throttle, -300);
}
