use crate::time::{TimeProvider, MINUTES_PER_DAY};
use async_trait::async_trait;
use chrono::TimeZone;
use std::{
    sync::{
        atomic::{AtomicI32, AtomicI64, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing_subscriber::fmt::time::FormatTime;

/// Settable clock. `sleep` advances the clock instead of waiting.
#[derive(Debug)]
pub struct MockTimeProvider {
    current_time: Arc<AtomicI64>,
    utc_offset_secs: AtomicI32,
    elapsed_nanos: AtomicU64,
}

impl MockTimeProvider {
    pub fn new(start_time: i64) -> Self {
        Self {
            current_time: Arc::new(AtomicI64::new(start_time)),
            utc_offset_secs: AtomicI32::new(0),
            elapsed_nanos: AtomicU64::new(0),
        }
    }

    pub fn with_utc_offset(self, offset_secs: i32) -> Self {
        self.utc_offset_secs.store(offset_secs, Ordering::SeqCst);
        self
    }

    /// Clock set to `hour:minute` UTC on 2024-11-29.
    pub fn at_hm(hour: u32, minute: u32) -> Self {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 11, 29, hour, minute, 0).single().map(|t| t.timestamp());
        Self::new(ts.unwrap_or_default())
    }

    pub fn advance_time(&self, seconds: i64) {
        self.current_time.fetch_add(seconds, Ordering::SeqCst);
        self.elapsed_nanos.fetch_add(seconds.max(0) as u64 * 1_000_000_000, Ordering::SeqCst);
    }

    pub fn set(&self, new_time: i64) {
        self.current_time.store(new_time, Ordering::SeqCst)
    }

    pub fn set_hm(&self, hour: i64, minute: i64) {
        let now = self.now();
        let sod = now - now.rem_euclid(86_400);
        self.set(sod + hour * 3600 + minute * 60);
    }
}

#[async_trait]
impl TimeProvider for MockTimeProvider {
    fn now(&self) -> i64 {
        self.current_time.load(Ordering::SeqCst)
    }

    fn now_millis(&self) -> i64 {
        self.now() * 1000
    }

    fn minute_of_day(&self) -> u16 {
        let local = self.now() + self.utc_offset_secs.load(Ordering::SeqCst) as i64;
        (local.rem_euclid(86_400) / 60) as u16 % MINUTES_PER_DAY
    }

    fn elapsed_realtime_nanos(&self) -> u64 {
        self.elapsed_nanos.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration.as_secs() as i64);
        tokio::task::yield_now().await;
    }
}

pub struct ProviderTimeFormatter<T: TimeProvider> {
    pub time_provider: Arc<T>,
}

impl<T: TimeProvider> FormatTime for ProviderTimeFormatter<T> {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        match chrono::Utc.timestamp_opt(self.time_provider.now(), 0).single() {
            Some(time) => write!(w, "{}", time.to_rfc3339()),
            None => write!(w, "{}", self.time_provider.now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_of_day_follows_offset() {
        let tp = MockTimeProvider::at_hm(20, 30);
        assert_eq!(tp.minute_of_day(), 1230);
        let tp = MockTimeProvider::at_hm(23, 0).with_utc_offset(3600);
        assert_eq!(tp.minute_of_day(), 0);
    }

    #[tokio::test]
    async fn sleep_advances_clock() {
        let tp = MockTimeProvider::at_hm(9, 29);
        tp.sleep(Duration::from_secs(120)).await;
        assert_eq!(tp.minute_of_day(), 9 * 60 + 31);
        assert_eq!(tp.elapsed_realtime_nanos(), 120_000_000_000);
    }

    #[test]
    fn set_hm_keeps_day() {
        let tp = MockTimeProvider::at_hm(1, 0);
        let day = tp.now() / 86_400;
        tp.set_hm(21, 15);
        assert_eq!(tp.now() / 86_400, day);
        assert_eq!(tp.minute_of_day(), 21 * 60 + 15);
    }
}
