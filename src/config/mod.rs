pub mod run_options;

use crate::{
    error::AppError,
    location::{coordinate::MockCoordinate, DEFAULT_PROVIDER, EMIT_INTERVAL_MS},
    schedule::window::ScheduleWindow,
};
use run_options::Args;
use serde::Deserialize;
use std::{fs, time::Duration};
use tracing::warn;

pub const CONFIG_FILE: &str = "./geomock.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPolicy {
    /// Re-apply the window on every check.
    #[default]
    Level,
    /// Apply only when the window verdict changes.
    Edge,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub start: String,
    pub end: String,
    pub check_interval_secs: u64,
    pub policy: TriggerPolicy,
}

impl Default for Schedule {
    fn default() -> Self {
        Self { start: "20:30".to_owned(), end: "09:30".to_owned(), check_interval_secs: 60, policy: TriggerPolicy::Level }
    }
}

impl Schedule {
    pub fn window(&self) -> Result<ScheduleWindow, AppError> {
        ScheduleWindow::parse(&self.start, &self.end)
    }

    pub fn check_interval(&self) -> Result<Duration, AppError> {
        if self.check_interval_secs == 0 {
            return Err(AppError::Config("schedule.check_interval_secs must be positive".to_owned()));
        }
        Ok(Duration::from_secs(self.check_interval_secs))
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f32,
    pub vertical_accuracy_m: Option<f32>,
    pub bearing_accuracy_deg: Option<f32>,
    pub speed_accuracy_mps: Option<f32>,
}

impl Default for Location {
    fn default() -> Self {
        let c = MockCoordinate::default();
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
            accuracy_m: c.accuracy_m,
            vertical_accuracy_m: c.vertical_accuracy_m,
            bearing_accuracy_deg: c.bearing_accuracy_deg,
            speed_accuracy_mps: c.speed_accuracy_mps,
        }
    }
}

impl Location {
    pub fn coordinate(&self) -> Result<MockCoordinate, AppError> {
        let coordinate = MockCoordinate {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy_m: self.accuracy_m,
            vertical_accuracy_m: self.vertical_accuracy_m,
            bearing_accuracy_deg: self.bearing_accuracy_deg,
            speed_accuracy_mps: self.speed_accuracy_mps,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Emitter {
    pub provider: String,
    pub interval_ms: u64,
}

impl Default for Emitter {
    fn default() -> Self {
        Self { provider: DEFAULT_PROVIDER.to_owned(), interval_ms: EMIT_INTERVAL_MS }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Sink {
    pub target: String,
}

impl Default for Sink {
    fn default() -> Self {
        Self { target: "127.0.0.1:29470".to_owned() }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub fine_location: bool,
    pub coarse_location: bool,
    pub mock_location: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self { fine_location: true, coarse_location: true, mock_location: true }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WebServer {
    pub address: String,
}

impl Default for WebServer {
    fn default() -> Self {
        Self { address: "0.0.0.0:8080".to_owned() }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: Schedule,
    pub location: Location,
    pub emitter: Emitter,
    pub sink: Sink,
    pub permissions: Permissions,
    pub web_server: WebServer,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, AppError> {
        if let Some(cfg_str) = &args.cfg_str {
            return Self::load_from_str(cfg_str);
        }
        if !args.cfg_file.exists() {
            warn!(file = %args.cfg_file.display(), "Config file not found, using defaults.");
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&args.cfg_file)?;
        Self::load_from_str(&config_content)
    }

    pub fn load_from_str(config_str: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(config_str).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.schedule.window()?;
        self.schedule.check_interval()?;
        self.location.coordinate()?;
        if self.emitter.interval_ms == 0 {
            return Err(AppError::Config("emitter.interval_ms must be positive".to_owned()));
        }
        if self.emitter.provider.is_empty() {
            return Err(AppError::Config("emitter.provider must not be empty".to_owned()));
        }
        Ok(())
    }
}
