//! Observed position readings.
//!
//! # Invariants
//! - A `Fix` is only constructed from a complete reading: finite, in-range
//!   coordinates and, when present, a finite non-negative accuracy.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// One position reading from a location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    latitude: f64,
    longitude: f64,
    accuracy_m: Option<f32>,
    time_ms: i64,
}

impl Fix {
    /// Validates and builds a fix.
    ///
    /// `time_ms` is the provider's fix time in Unix epoch milliseconds.
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy_m: Option<f32>,
        time_ms: i64,
    ) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(ValidationError::InvalidLatitude(latitude.to_string()));
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(ValidationError::InvalidLongitude(longitude.to_string()));
        }
        if let Some(accuracy) = accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(ValidationError::InvalidAccuracy(accuracy));
            }
        }
        Ok(Self {
            latitude,
            longitude,
            accuracy_m,
            time_ms,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Reported accuracy radius in meters, if the provider supplied one.
    pub fn accuracy_m(&self) -> Option<f32> {
        self.accuracy_m
    }

    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    /// Returns `(lat, lng)` in degrees.
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Fix;
    use crate::model::validation::ValidationError;

    #[test]
    fn new_rejects_partial_or_invalid_readings() {
        assert!(matches!(
            Fix::new(f64::NAN, 0.0, None, 0),
            Err(ValidationError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Fix::new(0.0, 181.0, None, 0),
            Err(ValidationError::InvalidLongitude(_))
        ));
        assert_eq!(
            Fix::new(0.0, 0.0, Some(-1.0), 0).unwrap_err(),
            ValidationError::InvalidAccuracy(-1.0)
        );
    }

    #[test]
    fn new_accepts_missing_accuracy() {
        let fix = Fix::new(47.6, -122.3, None, 1_000).unwrap();
        assert_eq!(fix.accuracy_m(), None);
        assert_eq!(fix.position(), (47.6, -122.3));
    }
}
