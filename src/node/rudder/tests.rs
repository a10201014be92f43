use super::*;
use crate::config::node_ids;
use crate::infra::codec::traits::Encode;
use crate::protocol::transport::can_id::CanId;
use embedded_can::{ExtendedId, StandardId};

fn node() -> RudderNode {
    RudderNode::new(FusionConfig::new(node_ids::RUDDER_CONTROLLER)).unwrap()
}

fn scheduler_for(node: &RudderNode) -> NodeScheduler {
    let mut scheduler = NodeScheduler::new(node.config().tick_hz);
    for &(id, rate) in node.schedule() {
        scheduler.add(id, rate).unwrap();
    }
    scheduler
}

fn short(id: u16, msg: &impl Encode) -> CanFrame {
    let (data, len) = msg.encode();
    CanFrame::standard(StandardId::new(id).unwrap(), &data[..len])
}

fn long(pgn: u32, msg: &impl Encode) -> CanFrame {
    let id = CanId::builder(pgn, node_ids::PRIMARY_CONTROLLER).build().unwrap();
    let (data, len) = msg.encode();
    CanFrame::extended(ExtendedId::new(id.0).unwrap(), &data[..len])
}

fn close(a: f32, b: f32) -> bool {
    let diff = a - b;
    diff < 1e-3 && diff > -1e-3
}

//==================================================================================ANGLE
#[test]
fn test_pot_to_radians_maps_limits() {
    assert!(close(pot_to_radians(100, 900, 100), MAX_DEFLECTION));
    assert!(close(pot_to_radians(900, 900, 100), -MAX_DEFLECTION));
    assert!(close(pot_to_radians(500, 900, 100), 0.0));
    assert!(close(pot_to_radians(300, 900, 100), MAX_DEFLECTION / 2.0));
}

#[test]
fn test_pot_to_radians_clamps() {
    assert_eq!(pot_to_radians(0, 900, 100), MAX_DEFLECTION);
    assert_eq!(pot_to_radians(1023, 900, 100), -MAX_DEFLECTION);
    assert_eq!(pot_to_radians(512, 0, 0), 0.0);
}

#[test]
fn test_angle_follows_sensors_and_calibration() {
    let mut node = node();
    node.update_sensors(RudderSensors {
        pot: 300,
        ..RudderSensors::default()
    });
    assert_eq!(node.angle(), 0.0);

    node.set_calibration(Calibration {
        port_limit: 100,
        starboard_limit: 900,
        calibrated: true,
        calibrating: false,
    });
    assert!(close(node.angle(), MAX_DEFLECTION / 2.0));
}

//==================================================================================OUTBOUND
#[test]
/// The details frame carries the pot value, both limits and every flag.
fn test_details_pack_round_trip() {
    let mut node = node();
    node.update_sensors(RudderSensors {
        pot: 612,
        port_limit_hit: false,
        starboard_limit_hit: true,
        temperature: 31.0,
    });
    node.set_calibration(Calibration {
        port_limit: 120,
        starboard_limit: 880,
        calibrated: true,
        calibrating: false,
    });

    let frame = node.pack(messages::DETAILS).unwrap();
    assert_eq!(frame.kind(), FrameKind::Short(ids::RUDDER_DETAILS));
    let details = RudderDetails::decode(frame.payload()).unwrap();
    assert_eq!(details.pot, 612);
    assert_eq!(details.port_limit, 120);
    assert_eq!(details.starboard_limit, 880);
    assert!(details.starboard_limit_hit);
    assert!(!details.port_limit_hit);
    assert!(details.enabled);
    assert!(details.calibrated);
    assert!(!details.calibrating);
}

#[test]
fn test_angle_frame_is_rudder_pgn() {
    let mut node = node();
    node.set_calibration(Calibration {
        port_limit: 100,
        starboard_limit: 900,
        ..Calibration::default()
    });
    node.update_sensors(RudderSensors {
        pot: 100,
        ..RudderSensors::default()
    });

    let frame = node.pack(messages::ANGLE).unwrap();
    let FrameKind::Long(id) = frame.kind() else {
        panic!("rudder angle must use an extended identifier");
    };
    assert_eq!(id.pgn(), PGN_RUDDER);
    assert_eq!(id.source_address(), node_ids::RUDDER_CONTROLLER);
    assert_eq!(id.priority(), PRIORITY_RAPID);

    let rudder = Rudder::decode(frame.payload()).unwrap();
    assert!(close(rudder.position.unwrap(), MAX_DEFLECTION));
    assert_eq!(rudder.angle_order, None);
}

#[test]
fn test_temperature_frame() {
    let mut node = node();
    node.update_sensors(RudderSensors {
        temperature: 25.0,
        ..RudderSensors::default()
    });
    let frame = node.pack(messages::TEMPERATURE).unwrap();
    let msg = EnvironmentalParameters2::decode(frame.payload()).unwrap();
    assert_eq!(msg.temperature_instance, Some(TEMPERATURE_INSTANCE_INSIDE));
    assert_eq!(msg.humidity_instance, None);
    assert!(close(msg.temperature.unwrap(), 25.0));
    assert_eq!(msg.humidity, None);
    assert_eq!(msg.pressure, None);
}

#[test]
fn test_status_bits() {
    let mut node = node();
    node.update_sensors(RudderSensors {
        port_limit_hit: true,
        ..RudderSensors::default()
    });
    node.set_calibration(Calibration {
        calibrating: true,
        ..Calibration::default()
    });
    let status = node.status_message();
    assert_eq!(status.node, node_ids::RUDDER_CONTROLLER);
    assert_eq!(status.status, 0b1010);
    assert_eq!(status.errors, 0);

    node.update_sensors(RudderSensors {
        starboard_limit_hit: true,
        ..RudderSensors::default()
    });
    node.set_calibration(Calibration {
        calibrated: true,
        ..Calibration::default()
    });
    assert_eq!(node.status_message().status, 0b0101);
}

#[test]
fn test_unknown_message_id() {
    assert!(node().pack(9).is_none());
}

//==================================================================================INBOUND
#[test]
fn test_calibration_request() {
    let mut node = node();
    let mut scheduler = scheduler_for(&node);
    let frame = short(ids::RUDDER_SET_STATE, &RudderSetState { calibrate: true });

    assert!(node.handle_frame(&frame, &mut scheduler));
    assert!(node.take_calibration_request());
    assert!(!node.take_calibration_request());

    let idle = short(ids::RUDDER_SET_STATE, &RudderSetState { calibrate: false });
    node.handle_frame(&idle, &mut scheduler);
    assert!(!node.take_calibration_request());
}

#[test]
fn test_calibration_request_ignored_while_calibrating() {
    let mut node = node();
    let mut scheduler = scheduler_for(&node);
    node.set_calibration(Calibration {
        calibrating: true,
        ..Calibration::default()
    });
    let frame = short(ids::RUDDER_SET_STATE, &RudderSetState { calibrate: true });
    node.handle_frame(&frame, &mut scheduler);
    assert!(!node.take_calibration_request());
}

#[test]
/// Primary rate drives the angle, secondary the details; 0xFF keeps.
fn test_tx_rate_command() {
    let mut node = node();
    let mut scheduler = scheduler_for(&node);
    assert_eq!(scheduler.get(messages::ANGLE).unwrap().period, 10);
    assert_eq!(scheduler.get(messages::DETAILS).unwrap().period, 25);

    let frame = short(
        ids::RUDDER_SET_TX_RATE,
        &RateCommand {
            primary: 20,
            secondary: 0xFF,
        },
    );
    assert!(node.handle_frame(&frame, &mut scheduler));
    assert_eq!(scheduler.get(messages::ANGLE).unwrap().period, 5);
    assert_eq!(scheduler.get(messages::DETAILS).unwrap().period, 25);

    let frame = short(
        ids::RUDDER_SET_TX_RATE,
        &RateCommand {
            primary: 0,
            secondary: 50,
        },
    );
    node.handle_frame(&frame, &mut scheduler);
    assert_eq!(scheduler.get(messages::ANGLE).unwrap().period, 5);
    assert_eq!(scheduler.get(messages::DETAILS).unwrap().period, 2);
    assert_eq!(scheduler.len(), 4);
}

#[test]
fn test_commanded_angle() {
    let mut node = node();
    let mut scheduler = scheduler_for(&node);
    let command = Rudder {
        angle_order: Some(-0.25),
        ..Rudder::default()
    };
    assert!(node.handle_frame(&long(PGN_RUDDER, &command), &mut scheduler));
    assert!(close(node.commanded_angle(), -0.25));

    // A position-only report leaves the command alone.
    let report = Rudder {
        position: Some(0.1),
        ..Rudder::default()
    };
    node.handle_frame(&long(PGN_RUDDER, &report), &mut scheduler);
    assert!(close(node.commanded_angle(), -0.25));
}

#[test]
fn test_foreign_frames_ignored() {
    let mut node = node();
    let mut scheduler = scheduler_for(&node);
    let frame = short(ids::IMU_DATA, &RudderSetState { calibrate: true });
    assert!(!node.handle_frame(&frame, &mut scheduler));
    let short_payload = CanFrame::standard(StandardId::new(ids::RUDDER_SET_TX_RATE).unwrap(), &[5]);
    assert!(!node.handle_frame(&short_payload, &mut scheduler));
    assert_eq!(scheduler.get(messages::ANGLE).unwrap().period, 10);
}

#[test]
fn test_rejects_node_id_outside_table() {
    assert_eq!(
        RudderNode::new(FusionConfig::new(0)).err(),
        Some(NodeInitError::InvalidNodeId { node_id: 0 })
    );
}
