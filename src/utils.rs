use crate::{test::utils::mock_time::ProviderTimeFormatter, time::TimeProvider};
use chrono::{Local, TimeZone, Utc};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. With a time provider, log timestamps follow
/// its clock (simulations). A second call is a no-op.
pub fn start_log<T: TimeProvider + 'static>(time_provider: Option<Arc<T>>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    _ = match time_provider {
        Some(time_provider) => builder.with_timer(ProviderTimeFormatter { time_provider }).try_init(),
        None => builder.try_init(),
    };
}

pub fn display_time(utc_time: chrono::DateTime<Utc>) -> String {
    let local_time = utc_time.with_timezone(&Local);
    local_time.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn ux_ts_to_string(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0).single().map(display_time).unwrap_or_else(|| ts.to_string())
}

pub fn minutes_to_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
