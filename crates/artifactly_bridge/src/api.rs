//! Use-case API for the hosting UI.
//!
//! # Responsibility
//! - Expose store, preference and tracking operations with scalar inputs.
//! - Return JSON strings, booleans or legacy integer status codes.
//!
//! # Invariants
//! - Exported functions never panic and never return `Err` to the host.
//! - JSON keys match the UI contract (`artId`, `locName`, ...).
//! - Lists keep store ordering: location name, then artifact name.

use artifactly_core::config::snapshot;
use artifactly_core::db::{lock, open_db, share, SharedConnection};
use artifactly_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ArtifactAtLocation, ArtifactService, ArtifactSummary, CollisionKind, CreateArtifactReport,
    DeleteLocationOutcome, Fix, Location, LocationArtifacts, LocationProviders, NotificationSink,
    Preferences, RadiusUnit, SharedPreferences, SqliteArtifactStore, StoreError, StoreResult,
    TrackerHandle, TrackerWorker, TrackingService, ValidationError,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

const DB_FILE_NAME: &str = "artifactly.sqlite3";
const PREFS_FILE_NAME: &str = "artifactly_prefs.json";
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
const EMPTY_LIST_JSON: &str = "[]";
const EMPTY_OBJECT_JSON: &str = "{}";

/// Minimal health-check API for host smoke integration.
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version to the host.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
/// Safe to call repeatedly with the same `level + log_dir`.
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Where the bridge keeps its files and how long it waits on `NotAvailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub db_path: PathBuf,
    pub prefs_path: PathBuf,
    pub retry_delay: Duration,
}

impl BridgeConfig {
    /// Config with the preferences file placed next to the database.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let prefs_path = db_path.with_file_name(PREFS_FILE_NAME);
        Self {
            db_path,
            prefs_path,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Resolves paths from `ARTIFACTLY_DB_PATH` / `ARTIFACTLY_PREFS_PATH` and
    /// the retry delay from `ARTIFACTLY_RETRY_DELAY_MS`.
    pub fn from_env() -> Self {
        let db_path = env_value("ARTIFACTLY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
        let mut config = Self::new(db_path);
        if let Some(prefs_path) = env_value("ARTIFACTLY_PREFS_PATH") {
            config.prefs_path = PathBuf::from(prefs_path);
        }
        if let Some(raw) = env_value("ARTIFACTLY_RETRY_DELAY_MS") {
            match raw.parse::<u64>() {
                Ok(millis) => config.retry_delay = Duration::from_millis(millis),
                Err(_) => warn!(
                    "event=bridge_config module=bridge status=fallback key=ARTIFACTLY_RETRY_DELAY_MS"
                ),
            }
        }
        config
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

fn env_value(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Create response envelope: `{isSuccess, code, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtifactResponse {
    pub is_success: bool,
    pub code: &'static str,
    pub message: String,
}

impl CreateArtifactResponse {
    fn new(is_success: bool, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            is_success,
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationDto {
    loc_id: String,
    loc_name: String,
    loc_lat: String,
    loc_lng: String,
}

impl From<&Location> for LocationDto {
    fn from(location: &Location) -> Self {
        Self {
            loc_id: location.id.to_string(),
            loc_name: location.name.clone(),
            loc_lat: location.coordinates.latitude().to_string(),
            loc_lng: location.coordinates.longitude().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactDto {
    art_id: String,
    art_name: String,
    art_data: String,
}

impl From<&ArtifactSummary> for ArtifactDto {
    fn from(artifact: &ArtifactSummary) -> Self {
        Self {
            art_id: artifact.id.to_string(),
            art_name: artifact.name.clone(),
            art_data: artifact.data.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LocationGroupDto {
    #[serde(flatten)]
    location: LocationDto,
    artifacts: Vec<ArtifactDto>,
}

impl From<&LocationArtifacts> for LocationGroupDto {
    fn from(group: &LocationArtifacts) -> Self {
        Self {
            location: LocationDto::from(&group.location),
            artifacts: group.artifacts.iter().map(ArtifactDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArtifactAtLocationDto {
    #[serde(flatten)]
    artifact: ArtifactDto,
    #[serde(flatten)]
    location: LocationDto,
}

impl From<&ArtifactAtLocation> for ArtifactAtLocationDto {
    fn from(value: &ArtifactAtLocation) -> Self {
        Self {
            artifact: ArtifactDto::from(&value.artifact),
            location: LocationDto::from(&value.location),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentFixDto {
    loc_lat: f64,
    loc_lng: f64,
    loc_accuracy: f32,
}

/// Tracking subsystem has not been started yet.
#[derive(Debug)]
struct NotAvailable;

/// Long-lived bridge state owned by the host process.
pub struct ArtifactlyBridge {
    conn: SharedConnection,
    preferences: SharedPreferences,
    prefs_path: PathBuf,
    retry_delay: Duration,
    tracker: Mutex<Option<TrackerHandle>>,
}

impl ArtifactlyBridge {
    /// Opens (and migrates) the database and loads stored preferences.
    pub fn open(config: BridgeConfig) -> Result<Self, String> {
        let conn = open_db(&config.db_path).map_err(|err| format!("bridge DB open failed: {err}"))?;
        let preferences = load_preferences(&config.prefs_path);
        Ok(Self {
            conn: share(conn),
            preferences: preferences.into_shared(),
            prefs_path: config.prefs_path,
            retry_delay: config.retry_delay,
            tracker: Mutex::new(None),
        })
    }

    /// Creates an artifact at a named place.
    pub fn create_artifact(
        &self,
        name: String,
        data: String,
        location_name: String,
        latitude: String,
        longitude: String,
    ) -> CreateArtifactResponse {
        let result = self.with_service(|service| {
            service.create_artifact_at_location(
                &name,
                Some(data.as_str()),
                &location_name,
                &latitude,
                &longitude,
            )
        });
        create_response(result)
    }

    /// `create_artifact` rendered as JSON for the web view.
    pub fn create_artifact_json(
        &self,
        name: String,
        data: String,
        location_name: String,
        latitude: String,
        longitude: String,
    ) -> String {
        let response = self.create_artifact(name, data, location_name, latitude, longitude);
        to_json(&response, EMPTY_OBJECT_JSON)
    }

    /// Returns `1`, `-1` name collision, `-2` error, `-3` invalid input,
    /// `-4` location-name collision.
    pub fn update_artifact(
        &self,
        artifact_id: String,
        name: String,
        data: String,
        location_id: String,
        location_name: String,
    ) -> i32 {
        let (Ok(artifact_id), Ok(location_id)) = (
            parse_id(&artifact_id, "artifact id"),
            parse_id(&location_id, "location id"),
        ) else {
            return -3;
        };
        let result = self.with_service(|service| {
            service.update_artifact(
                artifact_id,
                &name,
                Some(data.as_str()),
                location_id,
                &location_name,
            )
        });
        match result {
            Ok(()) => 1,
            Err(StoreError::Collision(CollisionKind::LocationName)) => -4,
            Err(StoreError::Collision(_)) => -1,
            Err(StoreError::Validation(_)) => -3,
            Err(_) => -2,
        }
    }

    /// Returns `1`, `-1` error, `-3` invalid input.
    pub fn update_artifact_data(&self, artifact_id: String, data: String) -> i32 {
        let Ok(artifact_id) = parse_id(&artifact_id, "artifact id") else {
            return -3;
        };
        match self.with_service(|service| service.update_artifact_data(artifact_id, Some(&data))) {
            Ok(()) => 1,
            Err(StoreError::Validation(_)) => -3,
            Err(_) => -1,
        }
    }

    /// Returns `1`, `-1` collision, `-2` error, `-3` invalid input.
    pub fn update_location(&self, location_id: String, name: String) -> i32 {
        let Ok(location_id) = parse_id(&location_id, "location id") else {
            return -3;
        };
        location_update_code(
            self.with_service(|service| service.update_location(location_id, &name)),
        )
    }

    /// Returns `1`, `-1` collision, `-2` error, `-3` invalid input.
    pub fn update_location_coordinates(
        &self,
        location_id: String,
        name: String,
        latitude: String,
        longitude: String,
    ) -> i32 {
        let Ok(location_id) = parse_id(&location_id, "location id") else {
            return -3;
        };
        location_update_code(self.with_service(|service| {
            service.update_location_coordinates(location_id, &name, &latitude, &longitude)
        }))
    }

    /// Returns `1` success, `-1` error, `-2` invalid input.
    pub fn delete_artifact(&self, artifact_id: String, location_id: String) -> i32 {
        let (Ok(artifact_id), Ok(location_id)) = (
            parse_id(&artifact_id, "artifact id"),
            parse_id(&location_id, "location id"),
        ) else {
            return -2;
        };
        match self.with_service(|service| service.delete_artifact(artifact_id, location_id)) {
            Ok(_) => 1,
            Err(_) => -1,
        }
    }

    /// Returns `1` deleted, `0` blocked by artifacts, `-1` error, `-2` invalid input.
    pub fn delete_location(&self, location_id: String) -> i32 {
        let Ok(location_id) = parse_id(&location_id, "location id") else {
            return -2;
        };
        match self.with_service(|service| service.delete_location(location_id)) {
            Ok(DeleteLocationOutcome::Deleted) => 1,
            Ok(DeleteLocationOutcome::Blocked { .. }) => 0,
            Err(_) => -1,
        }
    }

    /// One artifact at one location as JSON, or `{}` when absent.
    pub fn get_artifact(&self, artifact_id: String, location_id: String) -> String {
        let (Ok(artifact_id), Ok(location_id)) = (
            parse_id(&artifact_id, "artifact id"),
            parse_id(&location_id, "location id"),
        ) else {
            return EMPTY_OBJECT_JSON.to_string();
        };
        match self.with_service(|service| service.get_artifact(artifact_id, location_id)) {
            Ok(Some(found)) => to_json(&ArtifactAtLocationDto::from(&found), EMPTY_OBJECT_JSON),
            Ok(None) => EMPTY_OBJECT_JSON.to_string(),
            Err(err) => {
                warn!("event=get_artifact module=bridge status=error error={err}");
                EMPTY_OBJECT_JSON.to_string()
            }
        }
    }

    /// Every artifact grouped by location.
    pub fn get_artifacts(&self) -> String {
        groups_json(self.with_service(|service| service.get_artifacts()))
    }

    /// Artifacts within the preferred radius of the trusted fix.
    ///
    /// When tracking is not started yet, waits `retry_delay` once and tries
    /// again before degrading to `[]`.
    pub fn get_artifacts_near_current_fix(&self) -> String {
        let fix = match self.trusted_fix_with_retry() {
            Some(Some(fix)) => fix,
            Some(None) | None => return EMPTY_LIST_JSON.to_string(),
        };
        let radius_m = snapshot(&self.preferences).radius_meters();
        groups_json(self.with_service(|service| service.get_artifacts_near(&fix, radius_m)))
    }

    /// Every location ordered by name.
    pub fn get_locations(&self) -> String {
        match self.with_service(|service| service.get_locations()) {
            Ok(locations) => {
                let dtos = locations.iter().map(LocationDto::from).collect::<Vec<_>>();
                to_json(&dtos, EMPTY_LIST_JSON)
            }
            Err(err) => {
                warn!("event=get_locations module=bridge status=error error={err}");
                EMPTY_LIST_JSON.to_string()
            }
        }
    }

    pub fn has_artifacts_at_location(&self, location_id: String) -> bool {
        let Ok(location_id) = parse_id(&location_id, "location id") else {
            return false;
        };
        self.with_service(|service| service.has_artifacts_at_location(location_id))
            .unwrap_or(false)
    }

    /// `{locLat, locLng, locAccuracy}` of the trusted fix; zeros when none.
    pub fn get_current_fix(&self) -> String {
        let dto = match self.trusted_fix() {
            Ok(Some(fix)) => CurrentFixDto {
                loc_lat: fix.latitude(),
                loc_lng: fix.longitude(),
                loc_accuracy: fix.accuracy_m().unwrap_or_default(),
            },
            _ => CurrentFixDto::default(),
        };
        to_json(&dto, EMPTY_OBJECT_JSON)
    }

    /// `{radius, radiusUnit, soundNotification}`.
    pub fn get_preferences(&self) -> String {
        to_json(&snapshot(&self.preferences), EMPTY_OBJECT_JSON)
    }

    /// Sets the radius when it lies in `[1, 20000]`.
    pub fn set_radius(&self, radius: u32) -> bool {
        self.update_preferences(|prefs| prefs.set_radius(radius))
    }

    /// Sets the radius unit from `m|km|ft|mi`.
    pub fn set_radius_unit(&self, unit: String) -> bool {
        self.update_preferences(|prefs| {
            let unit = unit.parse::<RadiusUnit>()?;
            prefs.set_radius_unit(unit);
            Ok(())
        })
    }

    pub fn set_sound_notification(&self, enabled: bool) -> bool {
        self.update_preferences(|prefs| {
            prefs.set_sound_notification(enabled);
            Ok(())
        })
    }

    /// Starts the tracking worker, or re-runs provider selection when it is
    /// already running. A running worker keeps the providers and sink it was
    /// started with; the ones passed here are dropped in that case.
    ///
    /// Returns an empty string on success and the error message on failure.
    pub fn start_tracking<P, N>(&self, providers: P, sink: N) -> String
    where
        P: LocationProviders + 'static,
        N: NotificationSink + 'static,
    {
        let mut tracker = self.tracker_slot();
        if let Some(handle) = tracker.as_ref() {
            debug!("event=tracking_start module=bridge status=restart reason=already_running");
            return match handle.restart() {
                Ok(()) => String::new(),
                Err(err) => err.to_string(),
            };
        }

        let service = TrackingService::new(
            providers,
            sink,
            self.conn.clone(),
            self.preferences.clone(),
        );
        match TrackerWorker::spawn(service) {
            Ok(handle) => {
                *tracker = Some(handle);
                info!("event=tracking_start module=bridge status=ok");
                String::new()
            }
            Err(err) => {
                warn!("event=tracking_start module=bridge status=error error={err}");
                err.to_string()
            }
        }
    }

    /// Stops the worker after it drains queued fixes. `false` when not running.
    pub fn stop_tracking(&self) -> bool {
        let handle = self.tracker_slot().take();
        match handle {
            Some(handle) => match handle.shutdown() {
                Ok(()) => true,
                Err(err) => {
                    warn!("event=tracking_stop module=bridge status=error error={err}");
                    false
                }
            },
            None => false,
        }
    }

    /// Feeds one position reading to the worker. `false` when rejected as
    /// malformed or when tracking is not running.
    pub fn submit_fix(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy_m: Option<f32>,
        time_ms: i64,
    ) -> bool {
        let Ok(fix) = Fix::new(latitude, longitude, accuracy_m, time_ms) else {
            return false;
        };
        match self.tracker_slot().as_ref() {
            Some(handle) => handle.submit(fix).is_ok(),
            None => false,
        }
    }

    fn with_service<T>(
        &self,
        f: impl FnOnce(&mut ArtifactService<SqliteArtifactStore<'_>>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = lock(&self.conn)?;
        let store = SqliteArtifactStore::try_new(&mut conn)?;
        let mut service = ArtifactService::new(store);
        f(&mut service)
    }

    fn tracker_slot(&self) -> MutexGuard<'_, Option<TrackerHandle>> {
        match self.tracker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn trusted_fix(&self) -> Result<Option<Fix>, NotAvailable> {
        self.tracker_slot()
            .as_ref()
            .map(TrackerHandle::current_fix)
            .ok_or(NotAvailable)
    }

    /// `None` when tracking stayed unavailable after one retry.
    fn trusted_fix_with_retry(&self) -> Option<Option<Fix>> {
        match self.trusted_fix() {
            Ok(fix) => Some(fix),
            Err(NotAvailable) => {
                warn!(
                    "event=tracking_lookup module=bridge status=retry delay_ms={}",
                    self.retry_delay.as_millis()
                );
                std::thread::sleep(self.retry_delay);
                self.trusted_fix().ok()
            }
        }
    }

    fn update_preferences(
        &self,
        apply: impl FnOnce(&mut Preferences) -> Result<(), ValidationError>,
    ) -> bool {
        let updated = {
            let mut guard = match self.preferences.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(err) = apply(&mut *guard) {
                warn!("event=preferences_update module=bridge status=invalid error={err}");
                return false;
            }
            *guard
        };
        save_preferences(&self.prefs_path, &updated)
    }
}

fn create_response(result: StoreResult<CreateArtifactReport>) -> CreateArtifactResponse {
    match result {
        Ok(report) if report.is_duplicate() => CreateArtifactResponse::new(
            false,
            "already_exists",
            "This artifact already exists at this location.",
        ),
        Ok(report) if report.used_existing_location_name => CreateArtifactResponse::new(
            true,
            "ok",
            "Artifact created at an existing location with the same coordinates.",
        ),
        Ok(_) => CreateArtifactResponse::new(true, "ok", "Artifact created."),
        Err(StoreError::Collision(CollisionKind::LocationName)) => CreateArtifactResponse::new(
            false,
            "choose_different_location_name",
            "Location name is already used for a different place.",
        ),
        Err(StoreError::Validation(ValidationError::EmptyArtifactName)) => {
            CreateArtifactResponse::new(false, "artifact_name_error", "Artifact name is required.")
        }
        Err(StoreError::Validation(ValidationError::EmptyLocationName)) => {
            CreateArtifactResponse::new(false, "location_name_error", "Location name is required.")
        }
        Err(err) => CreateArtifactResponse::new(false, "error", format!("create failed: {err}")),
    }
}

fn location_update_code(result: StoreResult<()>) -> i32 {
    match result {
        Ok(()) => 1,
        Err(StoreError::Collision(_)) => -1,
        Err(StoreError::Validation(_)) => -3,
        Err(_) => -2,
    }
}

fn groups_json(result: StoreResult<Vec<LocationArtifacts>>) -> String {
    match result {
        Ok(groups) => {
            let dtos = groups.iter().map(LocationGroupDto::from).collect::<Vec<_>>();
            to_json(&dtos, EMPTY_LIST_JSON)
        }
        Err(err) => {
            warn!("event=get_artifacts module=bridge status=error error={err}");
            EMPTY_LIST_JSON.to_string()
        }
    }
}

fn parse_id(value: &str, field: &'static str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationError::InvalidId {
        field,
        value: value.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        warn!("event=json_encode module=bridge status=error error={err}");
        fallback.to_string()
    })
}

fn load_preferences(path: &Path) -> Preferences {
    if !path.exists() {
        return Preferences::default();
    }
    let loaded = std::fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|raw| serde_json::from_str::<Preferences>(&raw).map_err(|err| err.to_string()));
    match loaded {
        Ok(prefs) => prefs.sanitized(),
        Err(err) => {
            warn!("event=preferences_load module=bridge status=fallback error={err}");
            Preferences::default()
        }
    }
}

fn save_preferences(path: &Path, prefs: &Preferences) -> bool {
    let written = serde_json::to_string_pretty(prefs)
        .map_err(|err| err.to_string())
        .and_then(|raw| std::fs::write(path, raw).map_err(|err| err.to_string()));
    match written {
        Ok(()) => true,
        Err(err) => {
            warn!("event=preferences_save module=bridge status=error error={err}");
            false
        }
    }
}
