pub mod controller;
pub mod coordinate;
pub mod interface;
pub mod nmea;
pub mod permissions;
pub mod udp_sink;

pub const DEFAULT_PROVIDER: &str = "gps";
pub const EMIT_INTERVAL_MS: u64 = 2000;
