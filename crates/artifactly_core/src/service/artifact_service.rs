//! Artifact use-case service.
//!
//! # Responsibility
//! - Turn raw caller input (strings, doubles) into validated domain values.
//! - Delegate persistence to an `ArtifactStore` implementation.
//! - Emit metadata-only log events for every mutating use-case.
//!
//! # Invariants
//! - Blank names and malformed coordinates are rejected before the store is
//!   touched.
//! - Names are stored trimmed.
//! - Service layer remains storage-agnostic.

use crate::model::artifact::{
    ArtifactAtLocation, ArtifactId, ArtifactUpdate, LocationArtifacts, NewArtifact,
};
use crate::model::fix::Fix;
use crate::model::location::{Coordinates, Location, LocationId};
use crate::model::validation::{normalize_name, ValidationError};
use crate::repo::artifact_repo::{
    ArtifactStore, CreateArtifactReport, DeleteArtifactOutcome, DeleteLocationOutcome, StoreError,
    StoreResult,
};
use log::{error, info, warn};
use std::time::Instant;

/// Use-case service wrapper for artifact/location operations.
pub struct ArtifactService<S: ArtifactStore> {
    store: S,
}

impl<S: ArtifactStore> ArtifactService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an artifact at a named place, reusing matching rows.
    ///
    /// # Contract
    /// - `data` is stored verbatim; an empty string is kept as empty.
    /// - A full duplicate returns a report with `linked == false`.
    pub fn create_artifact_at_location(
        &mut self,
        name: &str,
        data: Option<&str>,
        location_name: &str,
        latitude: &str,
        longitude: &str,
    ) -> StoreResult<CreateArtifactReport> {
        let started_at = Instant::now();
        let request = NewArtifact {
            name: normalize_name(name, ValidationError::EmptyArtifactName)?,
            data: data.map(str::to_string),
            location_name: normalize_name(location_name, ValidationError::EmptyLocationName)?,
            coordinates: Coordinates::parse(latitude, longitude)?,
        };

        let result = self.store.create_artifact_at_location(&request);
        match &result {
            Ok(report) => info!(
                "event=artifact_create module=service status=ok artifact_id={} location_id={} artifact={:?} location={:?} linked={} duration_ms={}",
                report.artifact_id,
                report.location_id,
                report.artifact,
                report.location,
                report.linked,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("artifact_create", err, started_at),
        }
        result
    }

    /// Renames an artifact, replaces its data and renames its location.
    pub fn update_artifact(
        &mut self,
        artifact_id: ArtifactId,
        name: &str,
        data: Option<&str>,
        location_id: LocationId,
        location_name: &str,
    ) -> StoreResult<()> {
        let started_at = Instant::now();
        let update = ArtifactUpdate {
            artifact_id,
            name: normalize_name(name, ValidationError::EmptyArtifactName)?,
            data: data.map(str::to_string),
            location_id,
            location_name: normalize_name(location_name, ValidationError::EmptyLocationName)?,
        };

        let result = self.store.update_artifact(&update);
        log_unit_result("artifact_update", &result, started_at);
        result
    }

    /// Replaces the payload of one artifact.
    pub fn update_artifact_data(
        &mut self,
        artifact_id: ArtifactId,
        data: Option<&str>,
    ) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.store.update_artifact_data(artifact_id, data);
        log_unit_result("artifact_update_data", &result, started_at);
        result
    }

    /// Renames one location; renaming to its current name succeeds.
    pub fn update_location(&mut self, location_id: LocationId, name: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        let name = normalize_name(name, ValidationError::EmptyLocationName)?;
        let result = self.store.update_location(location_id, &name);
        log_unit_result("location_update", &result, started_at);
        result
    }

    /// Moves one location and sets its name.
    pub fn update_location_coordinates(
        &mut self,
        location_id: LocationId,
        name: &str,
        latitude: &str,
        longitude: &str,
    ) -> StoreResult<()> {
        let started_at = Instant::now();
        let name = normalize_name(name, ValidationError::EmptyLocationName)?;
        let coordinates = Coordinates::parse(latitude, longitude)?;
        let result = self
            .store
            .update_location_coordinates(location_id, &name, &coordinates);
        log_unit_result("location_update_coordinates", &result, started_at);
        result
    }

    /// Unlinks an artifact from a location, deleting it once unreferenced.
    pub fn delete_artifact(
        &mut self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<DeleteArtifactOutcome> {
        let started_at = Instant::now();
        let result = self.store.delete_artifact(artifact_id, location_id);
        match &result {
            Ok(outcome) => info!(
                "event=artifact_delete module=service status=ok outcome={outcome:?} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("artifact_delete", err, started_at),
        }
        result
    }

    /// Deletes a location unless artifacts still reference it.
    pub fn delete_location(&mut self, location_id: LocationId) -> StoreResult<DeleteLocationOutcome> {
        let started_at = Instant::now();
        let result = self.store.delete_location(location_id);
        match &result {
            Ok(DeleteLocationOutcome::Deleted) => info!(
                "event=location_delete module=service status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Ok(DeleteLocationOutcome::Blocked { associations }) => info!(
                "event=location_delete module=service status=blocked associations={associations} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("location_delete", err, started_at),
        }
        result
    }

    /// Gets one artifact as seen at one location.
    pub fn get_artifact(
        &self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<Option<ArtifactAtLocation>> {
        self.store.get_artifact(artifact_id, location_id)
    }

    /// Lists all artifacts grouped by location.
    pub fn get_artifacts(&self) -> StoreResult<Vec<LocationArtifacts>> {
        self.store.get_artifacts()
    }

    /// Lists artifacts within `radius_m` meters of `fix`.
    pub fn get_artifacts_near(&self, fix: &Fix, radius_m: u32) -> StoreResult<Vec<LocationArtifacts>> {
        self.store
            .get_artifacts_near(fix.position(), f64::from(radius_m))
    }

    /// Lists all locations ordered by name.
    pub fn get_locations(&self) -> StoreResult<Vec<Location>> {
        self.store.get_locations()
    }

    pub fn has_artifacts_at_location(&self, location_id: LocationId) -> StoreResult<bool> {
        self.store.has_artifacts_at_location(location_id)
    }
}

fn log_unit_result(event: &'static str, result: &StoreResult<()>, started_at: Instant) {
    match result {
        Ok(()) => info!(
            "event={event} module=service status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(event, err, started_at),
    }
}

fn log_failure(event: &'static str, err: &StoreError, started_at: Instant) {
    let duration_ms = started_at.elapsed().as_millis();
    match err {
        StoreError::Collision(kind) => warn!(
            "event={event} module=service status=collision kind={kind:?} duration_ms={duration_ms}"
        ),
        StoreError::NotFound(target) => warn!(
            "event={event} module=service status=not_found target={target} duration_ms={duration_ms}"
        ),
        StoreError::Validation(_) => {
            warn!("event={event} module=service status=invalid duration_ms={duration_ms}")
        }
        other => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error={other}"
        ),
    }
}
