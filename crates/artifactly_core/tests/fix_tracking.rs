use artifactly_core::db::{lock, open_db_in_memory, share, SharedConnection};
use artifactly_core::{
    ArtifactService, CoordinatorState, Fix, FixDecision, LocationArtifacts, LocationProviders,
    NotificationSink, NotifierAction, Preferences, ProviderError, ProviderKind,
    SharedPreferences, SqliteArtifactStore, TrackerWorker, TrackingService,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SinkEvent {
    Notify { locations: usize, sound: bool },
    Clear,
}

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, nearby: &[LocationArtifacts], sound: bool) {
        self.events.lock().unwrap().push(SinkEvent::Notify {
            locations: nearby.len(),
            sound,
        });
    }

    fn clear(&mut self) {
        self.events.lock().unwrap().push(SinkEvent::Clear);
    }
}

#[derive(Clone, Default)]
struct FakeProviders {
    active: Arc<Mutex<Vec<ProviderKind>>>,
    last_known: Option<Fix>,
}

impl FakeProviders {
    fn active(&self) -> Vec<ProviderKind> {
        self.active.lock().unwrap().clone()
    }
}

impl LocationProviders for FakeProviders {
    fn is_available(&self, kind: ProviderKind) -> bool {
        matches!(kind, ProviderKind::Network | ProviderKind::Gps)
    }

    fn activate(&mut self, kind: ProviderKind) -> Result<(), ProviderError> {
        let mut active = self.active.lock().unwrap();
        if !active.contains(&kind) {
            active.push(kind);
        }
        Ok(())
    }

    fn deactivate(&mut self, kind: ProviderKind) -> Result<(), ProviderError> {
        self.active.lock().unwrap().retain(|active| *active != kind);
        Ok(())
    }

    fn last_known_fix(&self, kind: ProviderKind) -> Option<Fix> {
        if kind == ProviderKind::Network {
            self.last_known
        } else {
            None
        }
    }
}

fn seeded_connection() -> SharedConnection {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = ArtifactService::new(SqliteArtifactStore::try_new(&mut conn).unwrap());
        service
            .create_artifact_at_location("Keys", None, "Home", "47.6062", "-122.3321")
            .unwrap();
    }
    share(conn)
}

fn tracking(
    providers: FakeProviders,
    preferences: SharedPreferences,
) -> (TrackingService<FakeProviders, RecordingSink>, RecordingSink) {
    let sink = RecordingSink::default();
    let service = TrackingService::new(providers, sink.clone(), seeded_connection(), preferences);
    (service, sink)
}

fn at_home(accuracy: f32, time_ms: i64, jitter: f64) -> Fix {
    Fix::new(47.6062 + jitter, -122.3321, Some(accuracy), time_ms).unwrap()
}

#[test]
fn accepted_fixes_within_a_minute_raise_one_notification() {
    let (mut service, sink) = tracking(FakeProviders::default(), Preferences::default().into_shared());
    service.start(0);

    let first = service.handle_fix(at_home(20.0, 1_000, 0.0001), 1_000);
    assert_eq!(first.decision, FixDecision::Accepted);
    assert_eq!(first.action, Some(NotifierAction::Notify { sound: true }));

    let second = service.handle_fix(at_home(10.0, 2_000, 0.0002), 40_000);
    assert_eq!(second.decision, FixDecision::Accepted);
    assert_eq!(second.action, Some(NotifierAction::Suppressed));

    assert_eq!(
        sink.events(),
        vec![SinkEvent::Notify {
            locations: 1,
            sound: true
        }]
    );
}

#[test]
fn accepted_fix_far_from_artifacts_clears_notification() {
    let (mut service, sink) = tracking(FakeProviders::default(), Preferences::default().into_shared());
    service.start(0);

    let far = Fix::new(45.5152, -122.6784, Some(15.0), 1_000).unwrap();
    let report = service.handle_fix(far, 1_000);
    assert_eq!(report.nearby_locations, Some(0));
    assert_eq!(sink.events(), vec![SinkEvent::Clear]);
}

#[test]
fn radius_preference_is_read_per_fix() {
    let preferences = Preferences::default().into_shared();
    let (mut service, sink) = tracking(FakeProviders::default(), Arc::clone(&preferences));
    service.start(0);

    preferences.write().unwrap().set_radius(1).unwrap();
    service.handle_fix(at_home(5.0, 1_000, 0.001), 1_000);
    assert_eq!(sink.events(), vec![SinkEvent::Clear]);
}

#[test]
fn duplicate_position_does_not_reach_the_store_or_sink() {
    let (mut service, sink) = tracking(FakeProviders::default(), Preferences::default().into_shared());
    service.start(0);

    let fix = at_home(20.0, 1_000, 0.0);
    service.handle_fix(fix, 1_000);
    let repeat = service.handle_fix(at_home(5.0, 90_000, 0.0), 90_000);
    assert_eq!(repeat.decision, FixDecision::Duplicate);
    assert_eq!(repeat.action, None);
    assert_eq!(sink.events().len(), 1);
}

#[test]
fn stale_trusted_fix_enables_gps_backup_until_next_acceptance() {
    let providers = FakeProviders::default();
    let (mut service, _sink) = tracking(providers.clone(), Preferences::default().into_shared());
    service.start(0);
    service.handle_fix(at_home(20.0, 0, 0.0), 0);

    let coarse = at_home(3_000.0, 100, 0.01);
    let report = service.handle_fix(coarse, 400_000);
    assert_eq!(report.decision, FixDecision::Rejected);
    assert_eq!(
        service.coordinator_state(),
        CoordinatorState::PrimaryActiveBackupActive
    );
    assert!(providers.active().contains(&ProviderKind::Gps));

    let fresh = at_home(15.0, 400_000, 0.002);
    assert_eq!(
        service.handle_fix(fresh, 400_000).decision,
        FixDecision::Accepted
    );
    assert_eq!(service.coordinator_state(), CoordinatorState::PrimaryActive);
}

#[test]
fn start_runs_last_known_fix_through_arbiter_and_stop_resets() {
    let providers = FakeProviders {
        last_known: Some(at_home(25.0, 500, 0.0)),
        ..FakeProviders::default()
    };
    let (mut service, sink) = tracking(providers.clone(), Preferences::default().into_shared());

    let reports = service.start(1_000);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].decision, FixDecision::Accepted);
    assert!(service.trusted_fix().is_some());
    assert_eq!(sink.events().len(), 1);
    let published = service.published_fix();
    assert!(published.read().unwrap().is_some());

    service.stop();
    assert_eq!(service.coordinator_state(), CoordinatorState::NoSource);
    assert!(service.trusted_fix().is_none());
    assert!(published.read().unwrap().is_none());
    assert!(providers.active().is_empty());
}

#[test]
fn restart_reselects_sources_but_keeps_throttles_and_trusted_fix() {
    let providers = FakeProviders::default();
    let (mut service, sink) = tracking(providers.clone(), Preferences::default().into_shared());
    service.start(0);

    service.handle_fix(at_home(20.0, 1_000, 0.0001), 1_000);
    let trusted = service.trusted_fix();
    assert!(trusted.is_some());

    service.restart(11_000);
    assert_eq!(service.coordinator_state(), CoordinatorState::PrimaryActive);
    assert_eq!(providers.active(), vec![ProviderKind::Network]);
    assert_eq!(service.trusted_fix(), trusted);

    let after = service.handle_fix(at_home(10.0, 11_000, 0.0002), 11_000);
    assert_eq!(after.decision, FixDecision::Accepted);
    assert_eq!(after.action, Some(NotifierAction::Suppressed));
    assert_eq!(
        sink.events(),
        vec![SinkEvent::Notify {
            locations: 1,
            sound: true
        }]
    );
}

#[test]
fn worker_restart_between_fixes_keeps_notification_throttle() {
    let sink = RecordingSink::default();
    let service = TrackingService::new(
        FakeProviders::default(),
        sink.clone(),
        seeded_connection(),
        Preferences::default().into_shared(),
    );
    let handle = TrackerWorker::spawn_with_clock(service, || 10_000).unwrap();

    handle.submit(at_home(20.0, 1_000, 0.0001)).unwrap();
    handle.restart().unwrap();
    handle.submit(at_home(10.0, 2_000, 0.0002)).unwrap();
    handle.shutdown().unwrap();

    assert_eq!(
        sink.events(),
        vec![SinkEvent::Notify {
            locations: 1,
            sound: true
        }]
    );
}

#[test]
fn worker_processes_fixes_in_order_and_stops_on_shutdown() {
    let sink = RecordingSink::default();
    let conn = seeded_connection();
    let service = TrackingService::new(
        FakeProviders::default(),
        sink.clone(),
        Arc::clone(&conn),
        Preferences::default().into_shared(),
    );
    let handle = TrackerWorker::spawn_with_clock(service, || 10_000).unwrap();

    handle.submit(at_home(20.0, 1_000, 0.0001)).unwrap();
    handle.submit(at_home(10.0, 2_000, 0.0002)).unwrap();
    handle.restart().unwrap();
    handle.shutdown().unwrap();

    assert_eq!(
        sink.events(),
        vec![SinkEvent::Notify {
            locations: 1,
            sound: true
        }]
    );
    // Store stays usable by other callers after the worker exits.
    assert!(lock(&conn).is_ok());
}

#[test]
fn dropping_handle_stops_worker() {
    let sink = RecordingSink::default();
    let service = TrackingService::new(
        FakeProviders::default(),
        sink.clone(),
        seeded_connection(),
        Preferences::default().into_shared(),
    );
    let handle = TrackerWorker::spawn_with_clock(service, || 0).unwrap();
    handle.submit(at_home(20.0, 0, 0.0)).unwrap();
    drop(handle);

    assert_eq!(sink.events().len(), 1);
}
