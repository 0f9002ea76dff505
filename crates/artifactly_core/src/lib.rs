//! Core domain logic for Artifactly.
//! This crate is the single source of truth for storage and tracking
//! invariants.

pub mod config;
pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tracking;

pub use config::{Preferences, SharedPreferences};
pub use geo::units::{to_meters, RadiusUnit};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::artifact::{ArtifactAtLocation, ArtifactId, ArtifactSummary, LocationArtifacts};
pub use model::fix::Fix;
pub use model::location::{Coordinates, Location, LocationId};
pub use model::validation::ValidationError;
pub use repo::artifact_repo::{
    ArtifactStore, CollisionKind, CreateArtifactReport, DeleteArtifactOutcome,
    DeleteLocationOutcome, Resolution, SqliteArtifactStore, StoreError, StoreResult,
};
pub use service::artifact_service::ArtifactService;
pub use tracking::arbiter::{FixArbiter, FixDecision};
pub use tracking::coordinator::{
    CoordinatorState, LocationProviders, ProviderCoordinator, ProviderError, ProviderKind,
};
pub use tracking::notifier::{NotificationSink, NotifierAction, ProximityNotifier};
pub use tracking::service::{FixReport, TrackingService};
pub use tracking::worker::{now_epoch_ms, TrackerError, TrackerHandle, TrackerWorker};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
