//! Message codecs of the control bus: NMEA 2000 PGNs on extended identifiers
//! and proprietary control messages on standard identifiers.
pub mod n2k;
pub mod proprietary;
