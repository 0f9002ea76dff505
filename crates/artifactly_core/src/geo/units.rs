//! Radius unit conversion.

use crate::model::validation::ValidationError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const METERS_PER_KILOMETER: f64 = 1000.0;
const METERS_PER_FOOT: f64 = 0.3048;
const METERS_PER_MILE: f64 = 1609.344;

/// Unit the search radius preference is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadiusUnit {
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "mi")]
    Miles,
}

impl RadiusUnit {
    /// Short label used in preferences and by the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Feet => "ft",
            Self::Miles => "mi",
        }
    }

    fn meters_per_unit(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Kilometers => METERS_PER_KILOMETER,
            Self::Feet => METERS_PER_FOOT,
            Self::Miles => METERS_PER_MILE,
        }
    }
}

impl Display for RadiusUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RadiusUnit {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(Self::Meters),
            "km" => Ok(Self::Kilometers),
            "ft" => Ok(Self::Feet),
            "mi" => Ok(Self::Miles),
            other => Err(ValidationError::UnknownRadiusUnit(other.to_string())),
        }
    }
}

/// Converts a radius in `unit` to whole meters, rounding to nearest.
pub fn to_meters(radius: u32, unit: RadiusUnit) -> u32 {
    match unit {
        RadiusUnit::Meters => radius,
        other => (f64::from(radius) * other.meters_per_unit()).round() as u32,
    }
}

/// Converts a radius whose unit is still an unparsed label.
///
/// An unknown label is a configuration error: it is logged and the raw radius
/// is returned unchanged.
pub fn to_meters_from_label(radius: u32, unit_label: &str) -> u32 {
    match unit_label.parse::<RadiusUnit>() {
        Ok(unit) => to_meters(radius, unit),
        Err(err) => {
            warn!("event=radius_convert module=geo status=fallback error={err}");
            radius
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{to_meters, to_meters_from_label, RadiusUnit};

    #[test]
    fn to_meters_converts_each_unit() {
        assert_eq!(to_meters(250, RadiusUnit::Meters), 250);
        assert_eq!(to_meters(3, RadiusUnit::Kilometers), 3000);
        assert_eq!(to_meters(1000, RadiusUnit::Feet), 305);
        assert_eq!(
            to_meters(5, RadiusUnit::Miles),
            (5.0_f64 * 1609.344).round() as u32
        );
    }

    #[test]
    fn unknown_label_falls_back_to_raw_radius() {
        assert_eq!(to_meters_from_label(42, "furlong"), 42);
        assert_eq!(to_meters_from_label(2, "KM"), 2000);
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_string(&RadiusUnit::Miles).unwrap();
        assert_eq!(json, "\"mi\"");
        let parsed: RadiusUnit = serde_json::from_str("\"ft\"").unwrap();
        assert_eq!(parsed, RadiusUnit::Feet);
    }
}
