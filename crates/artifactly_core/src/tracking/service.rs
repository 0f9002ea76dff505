//! Serial fix pipeline: arbitration, source coordination, proximity scan.
//!
//! # Responsibility
//! - Run one fix at a time through arbiter, coordinator, store scan and
//!   notifier.
//! - Publish the trusted fix for readers outside the worker.
//!
//! # Invariants
//! - Last-known fixes returned on start go through the arbiter like any
//!   other candidate.
//! - Restarting re-selects sources without resetting arbiter or notifier
//!   state; only `stop` forgets them.
//! - A store failure during the proximity scan is logged; it never stops
//!   the pipeline and never touches the sink.

use crate::config::{snapshot, SharedPreferences};
use crate::db::{lock, SharedConnection};
use crate::model::artifact::LocationArtifacts;
use crate::model::fix::Fix;
use crate::repo::artifact_repo::{ArtifactStore, SqliteArtifactStore, StoreResult};
use crate::tracking::arbiter::{ArbiterConfig, FixArbiter, FixDecision};
use crate::tracking::coordinator::{CoordinatorState, LocationProviders, ProviderCoordinator};
use crate::tracking::notifier::{NotificationSink, NotifierAction, ProximityNotifier};
use log::{debug, error, info};
use std::sync::{Arc, RwLock};

/// Trusted fix published for readers outside the tracking worker.
pub type SharedFix = Arc<RwLock<Option<Fix>>>;

/// Reads the published trusted fix.
pub fn current_fix(shared: &SharedFix) -> Option<Fix> {
    match shared.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// What happened to one fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixReport {
    pub decision: FixDecision,
    /// Locations within radius; `None` when no scan ran or it failed.
    pub nearby_locations: Option<usize>,
    pub action: Option<NotifierAction>,
}

impl FixReport {
    fn unscanned(decision: FixDecision) -> Self {
        Self {
            decision,
            nearby_locations: None,
            action: None,
        }
    }
}

pub struct TrackingService<P: LocationProviders, N: NotificationSink> {
    arbiter: FixArbiter,
    coordinator: ProviderCoordinator<P>,
    notifier: ProximityNotifier,
    sink: N,
    conn: SharedConnection,
    preferences: SharedPreferences,
    published: SharedFix,
}

impl<P: LocationProviders, N: NotificationSink> TrackingService<P, N> {
    pub fn new(
        providers: P,
        sink: N,
        conn: SharedConnection,
        preferences: SharedPreferences,
    ) -> Self {
        Self {
            arbiter: FixArbiter::new(ArbiterConfig::default()),
            coordinator: ProviderCoordinator::new(providers),
            notifier: ProximityNotifier::new(),
            sink,
            conn,
            preferences,
            published: Arc::new(RwLock::new(None)),
        }
    }

    /// Handle for reading the trusted fix from other threads.
    pub fn published_fix(&self) -> SharedFix {
        Arc::clone(&self.published)
    }

    pub fn trusted_fix(&self) -> Option<Fix> {
        self.arbiter.trusted()
    }

    pub fn coordinator_state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    /// Activates sources and evaluates their last-known fixes.
    pub fn start(&mut self, now_ms: i64) -> Vec<FixReport> {
        let last_known = self.coordinator.start();
        last_known
            .into_iter()
            .map(|fix| self.handle_fix(fix, now_ms))
            .collect()
    }

    /// Re-runs provider selection only. The trusted fix and both
    /// notification throttles carry over.
    pub fn restart(&mut self, now_ms: i64) -> Vec<FixReport> {
        info!("event=tracking_restart module=tracking status=start");
        self.coordinator.stop();
        self.start(now_ms)
    }

    /// Runs one candidate through the full pipeline.
    pub fn handle_fix(&mut self, fix: Fix, now_ms: i64) -> FixReport {
        let preferences = snapshot(&self.preferences);
        let radius_m = preferences.radius_meters();
        let decision = self.arbiter.consider(fix, radius_m, now_ms);
        debug!("event=fix_considered module=tracking status={decision:?} radius_m={radius_m}");

        match decision {
            FixDecision::Duplicate => FixReport::unscanned(decision),
            FixDecision::Rejected => {
                let stale = self.arbiter.is_stale(now_ms);
                self.coordinator.on_fix_not_accepted(stale);
                FixReport::unscanned(decision)
            }
            FixDecision::Accepted => {
                self.publish(Some(fix));
                self.coordinator.on_fix_accepted();

                let nearby = match self.scan_nearby(&fix, radius_m) {
                    Ok(nearby) => nearby,
                    Err(err) => {
                        error!(
                            "event=proximity_scan module=tracking status=error error={err}"
                        );
                        return FixReport::unscanned(decision);
                    }
                };

                let action =
                    self.notifier
                        .evaluate(nearby.len(), preferences.sound_notification(), now_ms);
                match action {
                    NotifierAction::Notify { sound } => {
                        info!(
                            "event=proximity_notify module=tracking status=notify locations={} sound={sound}",
                            nearby.len()
                        );
                        self.sink.notify(&nearby, sound);
                    }
                    NotifierAction::Clear => self.sink.clear(),
                    NotifierAction::Suppressed => {
                        debug!("event=proximity_notify module=tracking status=suppressed");
                    }
                }

                FixReport {
                    decision,
                    nearby_locations: Some(nearby.len()),
                    action: Some(action),
                }
            }
        }
    }

    /// Deactivates every source and forgets the trusted fix.
    pub fn stop(&mut self) {
        self.coordinator.stop();
        self.arbiter.reset();
        self.notifier.reset();
        self.publish(None);
    }

    fn scan_nearby(&self, fix: &Fix, radius_m: u32) -> StoreResult<Vec<LocationArtifacts>> {
        let mut conn = lock(&self.conn)?;
        let store = SqliteArtifactStore::try_new(&mut conn)?;
        store.get_artifacts_near(fix.position(), f64::from(radius_m))
    }

    fn publish(&self, fix: Option<Fix>) {
        match self.published.write() {
            Ok(mut guard) => *guard = fix,
            Err(poisoned) => *poisoned.into_inner() = fix,
        }
    }
}
