use super::interface::Fix;
use crate::error::AppError;

/// The one position this process ever reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MockCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f32,
    pub vertical_accuracy_m: Option<f32>,
    pub bearing_accuracy_deg: Option<f32>,
    pub speed_accuracy_mps: Option<f32>,
}

impl Default for MockCoordinate {
    fn default() -> Self {
        // No. 81, Jingfeng St, Wenshan District, Taipei City
        Self {
            latitude: 25.002070,
            longitude: 121.544402,
            accuracy_m: 1.0,
            vertical_accuracy_m: Some(0.1),
            bearing_accuracy_deg: Some(0.1),
            speed_accuracy_mps: Some(0.01),
        }
    }
}

impl MockCoordinate {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f32) -> Result<Self, AppError> {
        let coordinate = Self {
            latitude,
            longitude,
            accuracy_m,
            vertical_accuracy_m: None,
            bearing_accuracy_deg: None,
            speed_accuracy_mps: None,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::InvalidArgument(format!("latitude {} out of range", self.latitude)));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::InvalidArgument(format!("longitude {} out of range", self.longitude)));
        }
        let accuracies = [
            Some(self.accuracy_m),
            self.vertical_accuracy_m,
            self.bearing_accuracy_deg,
            self.speed_accuracy_mps,
        ];
        if accuracies.iter().flatten().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(AppError::InvalidArgument("accuracy values must be finite and non-negative".to_owned()));
        }
        Ok(())
    }

    /// Stamps the coordinate into a fix for `provider`.
    pub fn fix_at(&self, provider: &str, time_ms: i64, elapsed_realtime_nanos: u64) -> Fix {
        Fix {
            provider: provider.to_owned(),
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy_m: self.accuracy_m,
            vertical_accuracy_m: self.vertical_accuracy_m,
            bearing_accuracy_deg: self.bearing_accuracy_deg,
            speed_accuracy_mps: self.speed_accuracy_mps,
            time_ms,
            elapsed_realtime_nanos,
        }
    }
}
