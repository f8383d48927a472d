use num_derive::FromPrimitive;
use serde::Serialize;
use std::fmt::Display;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PermissionKind {
    FineLocation,
    CoarseLocation,
    /// Host switch allowing this process to act as a mock location source.
    MockLocation,
}

impl Display for PermissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            PermissionKind::FineLocation => "fine_location",
            PermissionKind::CoarseLocation => "coarse_location",
            PermissionKind::MockLocation => "mock_location",
        };
        f.write_str(kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, Serialize)]
#[repr(u8)]
pub enum Accuracy {
    Fine = 1,
    Coarse = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, Serialize)]
#[repr(u8)]
pub enum PowerUsage {
    Low = 1,
    Medium = 2,
    High = 3,
}

/// Capabilities advertised when registering a synthetic source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProviderProperties {
    pub requires_network: bool,
    pub requires_satellite: bool,
    pub requires_cell: bool,
    pub has_monetary_cost: bool,
    pub supports_altitude: bool,
    pub supports_speed: bool,
    pub supports_bearing: bool,
    pub power_usage: PowerUsage,
    pub accuracy: Accuracy,
}

impl Default for ProviderProperties {
    fn default() -> Self {
        Self {
            requires_network: false,
            requires_satellite: false,
            requires_cell: false,
            has_monetary_cost: false,
            supports_altitude: true,
            supports_speed: true,
            supports_bearing: true,
            power_usage: PowerUsage::High,
            accuracy: Accuracy::Coarse,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderHandle {
    pub id: u32,
    pub name: String,
}

impl ProviderHandle {
    pub fn new(id: u32, name: &str) -> Self {
        Self { id, name: name.to_owned() }
    }
}

/// A single reported position sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fix {
    pub provider: String,
    pub latitude: f64,
    pub longitude: f64,
    /// meters
    pub accuracy_m: f32,
    pub vertical_accuracy_m: Option<f32>,
    pub bearing_accuracy_deg: Option<f32>,
    pub speed_accuracy_mps: Option<f32>,
    /// Unix UTC milliseconds
    pub time_ms: i64,
    pub elapsed_realtime_nanos: u64,
}

pub trait LocationSubsystem: Send + Sync {
    fn register_synthetic_source(&self, name: &str, properties: &ProviderProperties)
        -> Result<ProviderHandle, AppError>;
    fn set_enabled(&self, handle: &ProviderHandle, enabled: bool) -> Result<(), AppError>;
    fn unregister(&self, handle: &ProviderHandle) -> Result<(), AppError>;
    fn push_fix(&self, handle: &ProviderHandle, fix: &Fix) -> Result<(), AppError>;
}

pub trait PermissionChecker: Send + Sync {
    fn has_permission(&self, kind: PermissionKind) -> bool;
}
