//! Location domain model.
//!
//! # Invariants
//! - At most one location exists per name and per `(lat, lng)` text pair.
//! - Coordinate text is stored exactly as accepted; it is never renormalized,
//!   so `"47.10"` and `"47.1"` are distinct places for deduplication.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable location identifier.
pub type LocationId = Uuid;

static DECIMAL_DEGREES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(\.\d+)?$").expect("valid decimal degrees regex"));

/// Decimal-degree coordinate pair in caller-supplied text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: String,
    longitude: String,
}

impl Coordinates {
    /// Validates coordinate text and keeps it verbatim (surrounding whitespace
    /// aside).
    ///
    /// # Errors
    /// - `InvalidLatitude` / `InvalidLongitude` when the text is not plain
    ///   decimal degrees or lies outside the valid range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, ValidationError> {
        let latitude = latitude.trim();
        let longitude = longitude.trim();
        parse_degrees(latitude, 90.0)
            .ok_or_else(|| ValidationError::InvalidLatitude(latitude.to_string()))?;
        parse_degrees(longitude, 180.0)
            .ok_or_else(|| ValidationError::InvalidLongitude(longitude.to_string()))?;
        Ok(Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    /// Returns `(lat, lng)` in degrees.
    pub fn degrees(&self) -> (f64, f64) {
        // Both values passed `parse_degrees` on construction.
        (
            self.latitude.parse().unwrap_or_default(),
            self.longitude.parse().unwrap_or_default(),
        )
    }
}

/// Named geographic point referenced by one or more artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    /// Unique display key.
    pub name: String,
    pub coordinates: Coordinates,
}

fn parse_degrees(text: &str, limit: f64) -> Option<f64> {
    if !DECIMAL_DEGREES_RE.is_match(text) {
        return None;
    }
    let value = text.parse::<f64>().ok()?;
    (value.abs() <= limit).then_some(value)
}
