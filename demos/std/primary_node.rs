//! # Primary node example
//!
//! Runs the primary node main loop on the host:
//! - Allocate the receive and transmit queues the way firmware does
//! - Feed a battery monitor, a GPS and a wind station onto the bus
//! - Read the fused values and watch sensors time out
//!
//! The loop is stepped with `NodeRunner::tick` instead of the async `run` so
//! that no time driver is needed.
//!
//! ```bash
//! cargo run --example primary_node
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_can::ExtendedId;
use n2k_fusion::config::{node_ids, FusionConfig};
use n2k_fusion::fusion::availability::Sensor;
use n2k_fusion::infra::codec::traits::Encode;
use n2k_fusion::node::primary::{LocalStatus, PrimaryNode};
use n2k_fusion::node::runner::NodeRunner;
use n2k_fusion::protocol::messages::n2k::{
    BatteryStatus, CogSogRapid, GnssDops, PositionRapid, WindData, GNSS_MODE_3D,
    PGN_BATTERY_STATUS, PGN_COG_SOG_RAPID, PGN_GNSS_DOPS, PGN_POSITION_RAPID, PGN_WIND_DATA,
};
use n2k_fusion::protocol::transport::can_frame::CanFrame;
use n2k_fusion::protocol::transport::can_id::CanId;
use n2k_fusion::protocol::transport::{RX_QUEUE_DEPTH, TX_QUEUE_DEPTH};
use static_cell::StaticCell;

type RxQueue = Channel<CriticalSectionRawMutex, CanFrame, RX_QUEUE_DEPTH>;
type TxQueue = Channel<CriticalSectionRawMutex, CanFrame, TX_QUEUE_DEPTH>;

static RX: StaticCell<RxQueue> = StaticCell::new();
static TX: StaticCell<TxQueue> = StaticCell::new();

fn frame(pgn: u32, source: u8, msg: &impl Encode) -> CanFrame {
    let id = CanId::builder(pgn, source).build().expect("broadcast PGN");
    let (data, len) = msg.encode();
    CanFrame::extended(ExtendedId::new(id.0).expect("29-bit id"), &data[..len])
}

fn main() {
    println!("=== n2k-fusion primary node ===\n");

    let rx: &'static RxQueue = RX.init(Channel::new());
    let tx: &'static TxQueue = TX.init(Channel::new());

    let config = FusionConfig::new(node_ids::PRIMARY_CONTROLLER).with_sensor_timeout(20);
    let mut node = PrimaryNode::new(config).expect("valid node id");
    node.set_status(LocalStatus {
        load: 23,
        temperature: 31,
        voltage: 124,
        ..LocalStatus::default()
    });
    let mut runner = NodeRunner::new(node, rx, tx).expect("mandatory messages scheduled");

    // ======================================================================
    // 1. One burst of sensor traffic
    // ======================================================================
    println!("1. Sensor traffic");
    let battery = BatteryStatus {
        voltage: Some(12.7),
        current: Some(-2.4),
        temperature: Some(19.5),
        ..Default::default()
    };
    let wind = WindData {
        speed: Some(6.2),
        direction: Some(1.2),
        ..Default::default()
    };
    let gps = [
        frame(
            PGN_POSITION_RAPID,
            12,
            &PositionRapid {
                latitude: Some(477_223_000),
                longitude: Some(-40_022_000),
            },
        ),
        frame(
            PGN_COG_SOG_RAPID,
            12,
            &CogSogRapid {
                cog: Some(3.1),
                sog: Some(2.8),
                ..Default::default()
            },
        ),
        frame(
            PGN_GNSS_DOPS,
            12,
            &GnssDops {
                actual_mode: Some(GNSS_MODE_3D),
                hdop: Some(0.9),
                vdop: Some(1.3),
                ..Default::default()
            },
        ),
    ];

    let _ = rx.try_send(frame(PGN_BATTERY_STATUS, 40, &battery));
    let _ = rx.try_send(frame(PGN_WIND_DATA, 35, &wind));
    for f in gps {
        let _ = rx.try_send(f);
    }
    let report = runner.tick();
    println!("   {:?}\n", report);

    // ======================================================================
    // 2. Fused values
    // ======================================================================
    println!("2. Data store");
    let fusion = runner.node_mut().fusion_mut();
    let power = fusion.store.get_power();
    println!(
        "   Power: {:.1} V, {:.1} A (new: {})",
        power.value.voltage, power.value.current, power.new_data
    );
    let wind = fusion.store.get_wind();
    println!(
        "   Wind: {:.1} m/s at {:.2} rad (new: {})",
        wind.value.speed, wind.value.direction, wind.new_data
    );
    let gps = fusion.store.get_gps();
    println!(
        "   GPS: lat {} lon {} mode {} (new: {})\n",
        gps.value.latitude, gps.value.longitude, gps.value.mode, gps.new_data
    );

    // ======================================================================
    // 3. Liveness over one silent second
    // ======================================================================
    println!("3. Liveness");
    let mut status_frames = 0;
    for tick in 2..=100 {
        let report = runner.tick();
        status_frames += report.sent;
        while tx.try_receive().is_ok() {}
        if tick % 10 == 0 {
            let availability = &runner.node().fusion().availability;
            println!(
                "   tick {:3}: power {} wind {} gps {}",
                tick,
                availability.is_active(Sensor::Power),
                availability.is_active(Sensor::WindStation),
                availability.is_active(Sensor::Gps),
            );
        }
    }
    println!("\n   Status frames sent: {}", status_frames);
}
