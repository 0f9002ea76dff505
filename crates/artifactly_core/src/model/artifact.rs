//! Artifact domain model and store read projections.
//!
//! # Invariants
//! - Artifact names are unique among the artifacts linked to one location,
//!   not globally.
//! - `created_at` is set once on insert and never rewritten.

use crate::model::location::{Coordinates, Location, LocationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable artifact identifier.
pub type ArtifactId = Uuid;

/// Artifact fields as listed under a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub id: ArtifactId,
    pub name: String,
    /// Free-form payload; absent and empty are both allowed.
    pub data: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// One artifact joined with one of its locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactAtLocation {
    pub artifact: ArtifactSummary,
    pub location: Location,
}

/// A location and its artifacts, ordered by artifact name ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationArtifacts {
    pub location: Location,
    pub artifacts: Vec<ArtifactSummary>,
}

/// Caller request for `create_artifact_at_location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtifact {
    pub name: String,
    pub data: Option<String>,
    pub location_name: String,
    pub coordinates: Coordinates,
}

/// Caller request for `update_artifact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpdate {
    pub artifact_id: ArtifactId,
    pub name: String,
    pub data: Option<String>,
    pub location_id: LocationId,
    pub location_name: String,
}
