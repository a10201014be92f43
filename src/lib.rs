//! `n2k-fusion` library: sensor fusion for boat control nodes sharing one CAN
//! bus in a `no_std` environment. Inbound NMEA 2000 and proprietary frames are
//! decoded into a data store, sensor and node liveness is tracked with
//! hysteresis, GPS fixes are reassembled from their three PGNs, and periodic
//! transmissions are driven by a per-node scheduler.
#![no_std]
//==================================================================================
/// Node configuration: id, tick rate and timeouts.
pub mod config;
/// Domain and low-level errors (CAN identifier construction, decoding,
/// scheduling and node startup).
pub mod error;
/// Field codec shared by every message layout.
pub mod infra;
/// Frame transport and message layouts (NMEA 2000 and proprietary).
pub mod protocol;
/// Data store, availability tracking, GPS reassembly and frame dispatch.
pub mod fusion;
/// Periodic transmission scheduling.
pub mod scheduler;
/// Node types and the main loop driving them.
pub mod node;
//==================================================================================
