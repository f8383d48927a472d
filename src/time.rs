use async_trait::async_trait;
use chrono::Timelike;
use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

pub const MINUTES_PER_DAY: u16 = 1440;

#[async_trait]
pub trait TimeProvider: Send + Sync + Debug {
    fn now(&self) -> i64; // Returns the current time as a Unix UTC timestamp
    fn now_millis(&self) -> i64;
    /// Local wall-clock minute of the day, in `[0, 1440)`.
    fn minute_of_day(&self) -> u16;
    /// Monotonic nanoseconds since the provider started ticking.
    fn elapsed_realtime_nanos(&self) -> u64;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug)]
pub struct RealTimeProvider {
    boot: Instant,
}

impl RealTimeProvider {
    pub fn new() -> Self {
        Self { boot: Instant::now() }
    }
}

impl Default for RealTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeProvider for RealTimeProvider {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn minute_of_day(&self) -> u16 {
        let local = chrono::Local::now();
        (local.hour() * 60 + local.minute()) as u16
    }

    fn elapsed_realtime_nanos(&self) -> u64 {
        self.boot.elapsed().as_nanos() as u64
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
