//! Artifact/location store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `locations`, `artifacts` and `location_artifacts` relations.
//! - Enforce deduplication and referential-integrity rules on every write.
//! - Return fully materialized, ordered read models.
//!
//! # Invariants
//! - Every mutating call runs in one `IMMEDIATE` transaction; a failure
//!   leaves the store exactly as it was before the call.
//! - At most one location per name and per coordinate text pair.
//! - An artifact row exists only while at least one association references it.
//! - A location row is never removed while an association references it.
//! - Listings are ordered by location name, then artifact name, ascending.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::geo::distance::is_within;
use crate::model::artifact::{
    ArtifactAtLocation, ArtifactId, ArtifactSummary, ArtifactUpdate, LocationArtifacts,
    NewArtifact,
};
use crate::model::location::{Coordinates, Location, LocationId};
use crate::model::validation::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ARTIFACT_AT_LOCATION_SELECT_SQL: &str = "SELECT
    a.uuid AS artifact_uuid,
    a.name AS artifact_name,
    a.data AS artifact_data,
    a.created_at AS created_at,
    l.uuid AS location_uuid,
    l.name AS location_name,
    l.lat AS lat,
    l.lng AS lng
FROM location_artifacts la
INNER JOIN artifacts a ON a.uuid = la.artifact_uuid
INNER JOIN locations l ON l.uuid = la.location_uuid";

const LOCATION_SELECT_SQL: &str = "SELECT
    uuid AS location_uuid,
    name AS location_name,
    lat,
    lng
FROM locations";

pub type StoreResult<T> = Result<T, StoreError>;

/// Which uniqueness rule a write would have violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Another artifact at the target location already uses the name.
    ArtifactNameAtLocation,
    /// Another location already uses the name.
    LocationName,
    /// Another location already sits at the coordinates.
    LocationCoordinates,
}

/// Target of a failed update/delete lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Artifact(ArtifactId),
    Location(LocationId),
    Association {
        artifact_id: ArtifactId,
        location_id: LocationId,
    },
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Artifact(id) => write!(f, "artifact {id}"),
            Self::Location(id) => write!(f, "location {id}"),
            Self::Association {
                artifact_id,
                location_id,
            } => write!(f, "artifact {artifact_id} at location {location_id}"),
        }
    }
}

/// Errors from store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Caller input rejected before touching storage.
    Validation(ValidationError),
    /// The write would break a uniqueness invariant.
    Collision(CollisionKind),
    /// Update/delete target is absent.
    NotFound(EntityRef),
    /// Underlying engine failure.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted row cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Collision(CollisionKind::ArtifactNameAtLocation) => {
                write!(f, "artifact name already used at this location")
            }
            Self::Collision(CollisionKind::LocationName) => {
                write!(f, "location name already used by a different location")
            }
            Self::Collision(CollisionKind::LocationCoordinates) => {
                write!(f, "coordinates already used by a different location")
            }
            Self::NotFound(target) => write!(f, "not found: {target}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "artifact store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whether an entity row was inserted or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Created,
    Existing,
}

/// Independent facts reported by `create_artifact_at_location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateArtifactReport {
    pub location_id: LocationId,
    pub artifact_id: ArtifactId,
    pub location: Resolution,
    pub artifact: Resolution,
    /// The coordinates matched a location stored under a different name; that
    /// location (and its name) was used instead of creating a new one.
    pub used_existing_location_name: bool,
    /// `false` when the exact artifact/location pair already existed and the
    /// call was a no-op.
    pub linked: bool,
}

impl CreateArtifactReport {
    /// The request duplicated an existing artifact at an existing location.
    pub fn is_duplicate(&self) -> bool {
        !self.linked
    }
}

/// Result of removing one artifact/location association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteArtifactOutcome {
    /// Association removed; the artifact is still linked elsewhere.
    Unlinked,
    /// Association and the now-unreferenced artifact row removed.
    Deleted,
}

/// Result of a location delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteLocationOutcome {
    Deleted,
    /// Refused: artifacts still reference the location. Not a failure.
    Blocked { associations: u32 },
}

/// Store interface for artifact/location persistence.
pub trait ArtifactStore {
    /// Creates (or reuses) an artifact and location and links them.
    fn create_artifact_at_location(
        &mut self,
        request: &NewArtifact,
    ) -> StoreResult<CreateArtifactReport>;
    /// Renames an artifact, replaces its data and renames its location.
    fn update_artifact(&mut self, update: &ArtifactUpdate) -> StoreResult<()>;
    /// Replaces only the artifact payload.
    fn update_artifact_data(&mut self, artifact_id: ArtifactId, data: Option<&str>)
        -> StoreResult<()>;
    /// Renames a location.
    fn update_location(&mut self, location_id: LocationId, name: &str) -> StoreResult<()>;
    /// Moves a location to new coordinates, optionally renaming it.
    fn update_location_coordinates(
        &mut self,
        location_id: LocationId,
        name: &str,
        coordinates: &Coordinates,
    ) -> StoreResult<()>;
    /// Removes one association and the artifact once it is unreferenced.
    fn delete_artifact(
        &mut self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<DeleteArtifactOutcome>;
    /// Removes a location that no artifact references.
    fn delete_location(&mut self, location_id: LocationId) -> StoreResult<DeleteLocationOutcome>;
    /// Loads one artifact as seen at one location.
    fn get_artifact(
        &self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<Option<ArtifactAtLocation>>;
    /// Lists every artifact grouped by location.
    fn get_artifacts(&self) -> StoreResult<Vec<LocationArtifacts>>;
    /// Lists artifacts whose location lies within `radius_m` of `origin`.
    fn get_artifacts_near(
        &self,
        origin: (f64, f64),
        radius_m: f64,
    ) -> StoreResult<Vec<LocationArtifacts>>;
    /// Lists every location ordered by name.
    fn get_locations(&self) -> StoreResult<Vec<Location>>;
    /// Returns whether any artifact references the location.
    fn has_artifacts_at_location(&self, location_id: LocationId) -> StoreResult<bool>;
}

/// SQLite-backed artifact store.
pub struct SqliteArtifactStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteArtifactStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl ArtifactStore for SqliteArtifactStore<'_> {
    fn create_artifact_at_location(
        &mut self,
        request: &NewArtifact,
    ) -> StoreResult<CreateArtifactReport> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(named) = find_location_by_name(&tx, &request.location_name)? {
            if named.coordinates != request.coordinates {
                return Err(StoreError::Collision(CollisionKind::LocationName));
            }
        }

        if let Some((artifact_id, location_id)) = find_artifact_at_named_location(
            &tx,
            &request.name,
            &request.location_name,
            &request.coordinates,
        )? {
            return Ok(CreateArtifactReport {
                location_id,
                artifact_id,
                location: Resolution::Existing,
                artifact: Resolution::Existing,
                used_existing_location_name: false,
                linked: false,
            });
        }

        let (location_id, location, used_existing_location_name) =
            match find_location_by_coordinates(&tx, &request.coordinates)? {
                Some(existing) => {
                    let renamed = existing.name != request.location_name;
                    (existing.id, Resolution::Existing, renamed)
                }
                None => {
                    let id = Uuid::new_v4();
                    tx.execute(
                        "INSERT INTO locations (uuid, name, lat, lng) VALUES (?1, ?2, ?3, ?4);",
                        params![
                            id.to_string(),
                            request.location_name.as_str(),
                            request.coordinates.latitude(),
                            request.coordinates.longitude(),
                        ],
                    )?;
                    (id, Resolution::Created, false)
                }
            };

        let (artifact_id, artifact) = match find_artifact_by_name(&tx, &request.name)? {
            Some(id) => (id, Resolution::Existing),
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO artifacts (uuid, name, data) VALUES (?1, ?2, ?3);",
                    params![id.to_string(), request.name.as_str(), request.data.as_deref()],
                )?;
                (id, Resolution::Created)
            }
        };

        // Reachable when the coordinates resolved to a location stored under
        // another name that already carries this artifact.
        if association_exists(&tx, artifact_id, location_id)? {
            return Ok(CreateArtifactReport {
                location_id,
                artifact_id,
                location,
                artifact,
                used_existing_location_name,
                linked: false,
            });
        }

        tx.execute(
            "INSERT INTO location_artifacts (artifact_uuid, location_uuid) VALUES (?1, ?2);",
            params![artifact_id.to_string(), location_id.to_string()],
        )?;
        tx.commit()?;

        Ok(CreateArtifactReport {
            location_id,
            artifact_id,
            location,
            artifact,
            used_existing_location_name,
            linked: true,
        })
    }

    fn update_artifact(&mut self, update: &ArtifactUpdate) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if artifact_name_taken_at_location(&tx, &update.name, update.location_id, update.artifact_id)?
        {
            return Err(StoreError::Collision(CollisionKind::ArtifactNameAtLocation));
        }
        if location_name_taken(&tx, &update.location_name, update.location_id)? {
            return Err(StoreError::Collision(CollisionKind::LocationName));
        }
        if !association_exists(&tx, update.artifact_id, update.location_id)? {
            return Err(StoreError::NotFound(EntityRef::Association {
                artifact_id: update.artifact_id,
                location_id: update.location_id,
            }));
        }

        let artifact_rows = tx.execute(
            "UPDATE artifacts SET name = ?2, data = ?3 WHERE uuid = ?1;",
            params![
                update.artifact_id.to_string(),
                update.name.as_str(),
                update.data.as_deref(),
            ],
        )?;
        if artifact_rows != 1 {
            return Err(StoreError::NotFound(EntityRef::Artifact(update.artifact_id)));
        }

        let location_rows = tx.execute(
            "UPDATE locations SET name = ?2 WHERE uuid = ?1;",
            params![update.location_id.to_string(), update.location_name.as_str()],
        )?;
        if location_rows != 1 {
            return Err(StoreError::NotFound(EntityRef::Location(update.location_id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn update_artifact_data(
        &mut self,
        artifact_id: ArtifactId,
        data: Option<&str>,
    ) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE artifacts SET data = ?2 WHERE uuid = ?1;",
            params![artifact_id.to_string(), data],
        )?;
        if changed != 1 {
            return Err(StoreError::NotFound(EntityRef::Artifact(artifact_id)));
        }
        Ok(())
    }

    fn update_location(&mut self, location_id: LocationId, name: &str) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if location_name_taken(&tx, name, location_id)? {
            return Err(StoreError::Collision(CollisionKind::LocationName));
        }

        let changed = tx.execute(
            "UPDATE locations SET name = ?2 WHERE uuid = ?1;",
            params![location_id.to_string(), name],
        )?;
        if changed != 1 {
            return Err(StoreError::NotFound(EntityRef::Location(location_id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn update_location_coordinates(
        &mut self,
        location_id: LocationId,
        name: &str,
        coordinates: &Coordinates,
    ) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(existing) = find_location_by_coordinates(&tx, coordinates)? {
            if existing.id != location_id {
                return Err(StoreError::Collision(CollisionKind::LocationCoordinates));
            }
        }
        if location_name_taken(&tx, name, location_id)? {
            return Err(StoreError::Collision(CollisionKind::LocationName));
        }

        let changed = tx.execute(
            "UPDATE locations SET name = ?2, lat = ?3, lng = ?4 WHERE uuid = ?1;",
            params![
                location_id.to_string(),
                name,
                coordinates.latitude(),
                coordinates.longitude(),
            ],
        )?;
        if changed != 1 {
            return Err(StoreError::NotFound(EntityRef::Location(location_id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_artifact(
        &mut self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<DeleteArtifactOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let artifact_text = artifact_id.to_string();

        let unlinked = tx.execute(
            "DELETE FROM location_artifacts WHERE artifact_uuid = ?1 AND location_uuid = ?2;",
            params![artifact_text.as_str(), location_id.to_string()],
        )?;
        if unlinked != 1 {
            return Err(StoreError::NotFound(EntityRef::Association {
                artifact_id,
                location_id,
            }));
        }

        let remaining: u32 = tx.query_row(
            "SELECT COUNT(*) FROM location_artifacts WHERE artifact_uuid = ?1;",
            [artifact_text.as_str()],
            |row| row.get(0),
        )?;

        let outcome = if remaining == 0 {
            let deleted = tx.execute(
                "DELETE FROM artifacts WHERE uuid = ?1;",
                [artifact_text.as_str()],
            )?;
            if deleted != 1 {
                return Err(StoreError::NotFound(EntityRef::Artifact(artifact_id)));
            }
            DeleteArtifactOutcome::Deleted
        } else {
            DeleteArtifactOutcome::Unlinked
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn delete_location(&mut self, location_id: LocationId) -> StoreResult<DeleteLocationOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let location_text = location_id.to_string();

        let associations: u32 = tx.query_row(
            "SELECT COUNT(*) FROM location_artifacts WHERE location_uuid = ?1;",
            [location_text.as_str()],
            |row| row.get(0),
        )?;
        if associations > 0 {
            return Ok(DeleteLocationOutcome::Blocked { associations });
        }

        let deleted = tx.execute(
            "DELETE FROM locations WHERE uuid = ?1;",
            [location_text.as_str()],
        )?;
        if deleted != 1 {
            return Err(StoreError::NotFound(EntityRef::Location(location_id)));
        }

        tx.commit()?;
        Ok(DeleteLocationOutcome::Deleted)
    }

    fn get_artifact(
        &self,
        artifact_id: ArtifactId,
        location_id: LocationId,
    ) -> StoreResult<Option<ArtifactAtLocation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTIFACT_AT_LOCATION_SELECT_SQL}
             WHERE la.artifact_uuid = ?1
               AND la.location_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![artifact_id.to_string(), location_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_artifact_at_location_row(row)?));
        }
        Ok(None)
    }

    fn get_artifacts(&self) -> StoreResult<Vec<LocationArtifacts>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTIFACT_AT_LOCATION_SELECT_SQL}
             ORDER BY l.name ASC, a.name ASC, a.uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut joined = Vec::new();
        while let Some(row) = rows.next()? {
            joined.push(parse_artifact_at_location_row(row)?);
        }
        Ok(group_by_location(joined))
    }

    fn get_artifacts_near(
        &self,
        origin: (f64, f64),
        radius_m: f64,
    ) -> StoreResult<Vec<LocationArtifacts>> {
        let mut groups = self.get_artifacts()?;
        groups.retain(|group| is_within(origin, group.location.coordinates.degrees(), radius_m));
        Ok(groups)
    }

    fn get_locations(&self) -> StoreResult<Vec<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} ORDER BY name ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }
        Ok(locations)
    }

    fn has_artifacts_at_location(&self, location_id: LocationId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM location_artifacts WHERE location_uuid = ?1
            );",
            [location_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn group_by_location(joined: Vec<ArtifactAtLocation>) -> Vec<LocationArtifacts> {
    let mut groups: Vec<LocationArtifacts> = Vec::new();
    for entry in joined {
        match groups.last_mut() {
            Some(group) if group.location.id == entry.location.id => {
                group.artifacts.push(entry.artifact);
            }
            _ => groups.push(LocationArtifacts {
                location: entry.location,
                artifacts: vec![entry.artifact],
            }),
        }
    }
    groups
}

fn find_location_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Location>> {
    let mut stmt = conn.prepare(&format!("{LOCATION_SELECT_SQL} WHERE name = ?1;"))?;
    let mut rows = stmt.query([name])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_location_row(row)?));
    }
    Ok(None)
}

fn find_location_by_coordinates(
    conn: &Connection,
    coordinates: &Coordinates,
) -> StoreResult<Option<Location>> {
    let mut stmt = conn.prepare(&format!(
        "{LOCATION_SELECT_SQL} WHERE lat = ?1 AND lng = ?2;"
    ))?;
    let mut rows = stmt.query(params![coordinates.latitude(), coordinates.longitude()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_location_row(row)?));
    }
    Ok(None)
}

fn find_artifact_at_named_location(
    conn: &Connection,
    artifact_name: &str,
    location_name: &str,
    coordinates: &Coordinates,
) -> StoreResult<Option<(ArtifactId, LocationId)>> {
    let ids = conn
        .query_row(
            "SELECT la.artifact_uuid, la.location_uuid
             FROM location_artifacts la
             INNER JOIN artifacts a ON a.uuid = la.artifact_uuid
             INNER JOIN locations l ON l.uuid = la.location_uuid
             WHERE a.name = ?1
               AND l.name = ?2
               AND l.lat = ?3
               AND l.lng = ?4
             LIMIT 1;",
            params![
                artifact_name,
                location_name,
                coordinates.latitude(),
                coordinates.longitude(),
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    match ids {
        Some((artifact_text, location_text)) => Ok(Some((
            parse_uuid(&artifact_text, "location_artifacts.artifact_uuid")?,
            parse_uuid(&location_text, "location_artifacts.location_uuid")?,
        ))),
        None => Ok(None),
    }
}

/// Oldest artifact with the given name; names may repeat after renames.
fn find_artifact_by_name(conn: &Connection, name: &str) -> StoreResult<Option<ArtifactId>> {
    let id_text = conn
        .query_row(
            "SELECT uuid FROM artifacts
             WHERE name = ?1
             ORDER BY created_at ASC, uuid ASC
             LIMIT 1;",
            [name],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    id_text
        .map(|value| parse_uuid(&value, "artifacts.uuid"))
        .transpose()
}

fn association_exists(
    conn: &Connection,
    artifact_id: ArtifactId,
    location_id: LocationId,
) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM location_artifacts
            WHERE artifact_uuid = ?1 AND location_uuid = ?2
        );",
        params![artifact_id.to_string(), location_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn artifact_name_taken_at_location(
    conn: &Connection,
    name: &str,
    location_id: LocationId,
    excluding: ArtifactId,
) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM location_artifacts la
            INNER JOIN artifacts a ON a.uuid = la.artifact_uuid
            WHERE la.location_uuid = ?1
              AND a.name = ?2
              AND a.uuid <> ?3
        );",
        params![location_id.to_string(), name, excluding.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn location_name_taken(conn: &Connection, name: &str, excluding: LocationId) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM locations WHERE name = ?1 AND uuid <> ?2
        );",
        params![name, excluding.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_location_row(row: &Row<'_>) -> StoreResult<Location> {
    let id_text: String = row.get("location_uuid")?;
    let lat: String = row.get("lat")?;
    let lng: String = row.get("lng")?;
    let coordinates = Coordinates::parse(&lat, &lng).map_err(|err| {
        StoreError::InvalidData(format!("location {id_text} has bad coordinates: {err}"))
    })?;
    Ok(Location {
        id: parse_uuid(&id_text, "locations.uuid")?,
        name: row.get("location_name")?,
        coordinates,
    })
}

fn parse_artifact_at_location_row(row: &Row<'_>) -> StoreResult<ArtifactAtLocation> {
    let id_text: String = row.get("artifact_uuid")?;
    Ok(ArtifactAtLocation {
        artifact: ArtifactSummary {
            id: parse_uuid(&id_text, "artifacts.uuid")?,
            name: row.get("artifact_name")?,
            data: row.get("artifact_data")?,
            created_at: row.get("created_at")?,
        },
        location: parse_location_row(row)?,
    })
}

fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
