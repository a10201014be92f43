//! Sensor fusion state of a node: the data store, the liveness model and the
//! GPS reassembly buffer, bundled into one owned context that the dispatcher
//! and the main loop borrow mutably.
pub mod availability;
pub mod dispatcher;
pub mod gps_bundle;
pub mod store;

use crate::config::FusionConfig;
use availability::{AvailabilityTracker, NodeTable};
use gps_bundle::GpsBundle;
use store::DataStore;

#[derive(Debug, Clone)]
pub struct FusionContext {
    pub config: FusionConfig,
    pub store: DataStore,
    pub availability: AvailabilityTracker,
    pub nodes: NodeTable,
    pub gps: GpsBundle,
}

impl FusionContext {
    /// Fresh context: every sensor disconnected, every remote node unknown,
    /// every reading zeroed without new data.
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            store: DataStore::default(),
            availability: AvailabilityTracker::new(config.sensor_timeout),
            nodes: NodeTable::new(config.node_id, config.node_timeout),
            gps: GpsBundle::new(),
        }
    }

    /// Age sensor and node liveness by one tick.
    pub fn tick(&mut self) {
        self.nodes.tick();
        self.availability.tick();
    }
}
