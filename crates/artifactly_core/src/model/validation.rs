//! Caller-input validation shared by store and tracking entry points.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected caller input. Raised before any storage access.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Artifact name is blank after trim.
    EmptyArtifactName,
    /// Location name is blank after trim.
    EmptyLocationName,
    /// Latitude text is not decimal degrees in `[-90, 90]`.
    InvalidLatitude(String),
    /// Longitude text is not decimal degrees in `[-180, 180]`.
    InvalidLongitude(String),
    /// Identifier text is not a UUID.
    InvalidId { field: &'static str, value: String },
    /// Radius is outside the accepted preference bounds.
    RadiusOutOfRange { value: u32, min: u32, max: u32 },
    /// Radius unit label is not one of `m|km|ft|mi`.
    UnknownRadiusUnit(String),
    /// Accuracy is negative or not finite.
    InvalidAccuracy(f32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArtifactName => write!(f, "artifact name must not be blank"),
            Self::EmptyLocationName => write!(f, "location name must not be blank"),
            Self::InvalidLatitude(value) => write!(f, "invalid latitude `{value}`"),
            Self::InvalidLongitude(value) => write!(f, "invalid longitude `{value}`"),
            Self::InvalidId { field, value } => write!(f, "invalid {field} `{value}`"),
            Self::RadiusOutOfRange { value, min, max } => {
                write!(f, "radius {value} is outside [{min}, {max}]")
            }
            Self::UnknownRadiusUnit(value) => {
                write!(f, "unknown radius unit `{value}`; expected m|km|ft|mi")
            }
            Self::InvalidAccuracy(value) => write!(f, "invalid accuracy {value}"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name, rejecting blank input with the given error.
pub fn normalize_name(value: &str, blank: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, ValidationError};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(
            normalize_name("  Home ", ValidationError::EmptyLocationName).unwrap(),
            "Home"
        );
        assert_eq!(
            normalize_name(" \t", ValidationError::EmptyArtifactName).unwrap_err(),
            ValidationError::EmptyArtifactName
        );
    }
}
