//! NMEA 0183 encoding of fixes (`$GPGGA` and `$GPRMC`).

use super::interface::Fix;
use chrono::{DateTime, TimeZone, Utc};

/// Minutes are written with four decimals.
const MINUTE_SCALE: f64 = 10_000.0;

/// XOR of every byte between `$` and `*`.
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

pub fn sentence(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, checksum(body))
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere letter.
fn degrees_minutes(value: f64, degree_width: usize, positive: char, negative: char) -> (String, char) {
    let hemisphere = if value < 0.0 { negative } else { positive };
    let total = (value.abs() * 60.0 * MINUTE_SCALE).round() as u64;
    let scale = MINUTE_SCALE as u64;
    let degrees = total / (60 * scale);
    let rem = total % (60 * scale);
    (format!("{:0width$}{:02}.{:04}", degrees, rem / scale, rem % scale, width = degree_width), hemisphere)
}

pub fn latitude(value: f64) -> (String, char) {
    degrees_minutes(value, 2, 'N', 'S')
}

pub fn longitude(value: f64) -> (String, char) {
    degrees_minutes(value, 3, 'E', 'W')
}

fn fix_time(fix: &Fix) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(fix.time_ms).single().unwrap_or_default()
}

fn hhmmss(time: &DateTime<Utc>) -> String {
    format!("{}.{:02}", time.format("%H%M%S"), time.timestamp_subsec_millis() / 10)
}

pub fn gga(fix: &Fix) -> String {
    let time = fix_time(fix);
    let (lat, ns) = latitude(fix.latitude);
    let (lon, ew) = longitude(fix.longitude);
    // fix quality 1 (GPS), 8 satellites, hdop taken from the horizontal accuracy
    let body = format!(
        "GPGGA,{},{},{},{},{},1,08,{:.1},0.0,M,0.0,M,,",
        hhmmss(&time),
        lat,
        ns,
        lon,
        ew,
        fix.accuracy_m.max(0.1)
    );
    sentence(&body)
}

pub fn rmc(fix: &Fix) -> String {
    let time = fix_time(fix);
    let (lat, ns) = latitude(fix.latitude);
    let (lon, ew) = longitude(fix.longitude);
    let body = format!(
        "GPRMC,{},A,{},{},{},{},0.0,0.0,{},,,A",
        hhmmss(&time),
        lat,
        ns,
        lon,
        ew,
        time.format("%d%m%y")
    );
    sentence(&body)
}

/// The datagram sent for one fix.
pub fn encode(fix: &Fix) -> String {
    let mut out = gga(fix);
    out.push_str(&rmc(fix));
    out
}
