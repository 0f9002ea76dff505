//! Position-source coordination.
//!
//! # Responsibility
//! - Pick and activate the primary source, plus the passive listener.
//! - Toggle the GPS backup listener based on trusted-fix staleness.
//!
//! # Invariants
//! - Activation/deactivation failures are logged and leave the recorded
//!   state unchanged; they never propagate to the caller.
//! - Activating an already active backup is a no-op.
//! - `stop` always ends in `CoordinatorState::NoSource`.

use crate::model::fix::Fix;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Abstract position source classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Network,
    Gps,
    Passive,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Gps => "gps",
            Self::Passive => "passive",
        }
    }
}

/// Primary candidates in preference order.
const PRIMARY_PREFERENCE: [ProviderKind; 2] = [ProviderKind::Network, ProviderKind::Gps];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    Unavailable(ProviderKind),
    PermissionDenied(ProviderKind),
    Failed { kind: ProviderKind, message: String },
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(kind) => write!(f, "{} provider is unavailable", kind.label()),
            Self::PermissionDenied(kind) => {
                write!(f, "permission denied for {} provider", kind.label())
            }
            Self::Failed { kind, message } => {
                write!(f, "{} provider failed: {message}", kind.label())
            }
        }
    }
}

impl Error for ProviderError {}

/// Platform position sources, seen through the operations the core needs.
///
/// Implementations push fixes into the tracking worker themselves; this
/// trait only controls which sources are listening.
pub trait LocationProviders: Send {
    fn is_available(&self, kind: ProviderKind) -> bool;
    fn activate(&mut self, kind: ProviderKind) -> Result<(), ProviderError>;
    fn deactivate(&mut self, kind: ProviderKind) -> Result<(), ProviderError>;
    fn last_known_fix(&self, kind: ProviderKind) -> Option<Fix>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    NoSource,
    PrimaryActive,
    PrimaryActiveBackupActive,
}

/// Tracks which listeners are active and drives transitions between them.
pub struct ProviderCoordinator<P: LocationProviders> {
    providers: P,
    primary: Option<ProviderKind>,
    passive_active: bool,
    backup_active: bool,
}

impl<P: LocationProviders> ProviderCoordinator<P> {
    pub fn new(providers: P) -> Self {
        Self {
            providers,
            primary: None,
            passive_active: false,
            backup_active: false,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        match (self.primary, self.backup_active) {
            (None, _) => CoordinatorState::NoSource,
            (Some(_), false) => CoordinatorState::PrimaryActive,
            (Some(_), true) => CoordinatorState::PrimaryActiveBackupActive,
        }
    }

    pub fn primary(&self) -> Option<ProviderKind> {
        self.primary
    }

    pub fn is_passive_active(&self) -> bool {
        self.passive_active
    }

    pub fn providers(&self) -> &P {
        &self.providers
    }

    /// Activates the best available primary source and the passive listener.
    ///
    /// Returns the last-known fixes of the primary-class sources so the
    /// caller can run them through arbitration. Calling `start` while a
    /// primary is active re-activates nothing and returns no fixes.
    pub fn start(&mut self) -> Vec<Fix> {
        if self.primary.is_some() {
            debug!("event=providers_start module=tracking status=skip reason=already_started");
            return Vec::new();
        }

        for kind in PRIMARY_PREFERENCE {
            if !self.providers.is_available(kind) {
                continue;
            }
            if self.try_activate(kind) {
                self.primary = Some(kind);
                break;
            }
        }

        if !self.passive_active && self.providers.is_available(ProviderKind::Passive) {
            self.passive_active = self.try_activate(ProviderKind::Passive);
        }

        match self.primary {
            Some(kind) => info!(
                "event=providers_start module=tracking status=ok primary={} passive={}",
                kind.label(),
                self.passive_active
            ),
            None => warn!(
                "event=providers_start module=tracking status=no_source passive={}",
                self.passive_active
            ),
        }

        PRIMARY_PREFERENCE
            .iter()
            .filter_map(|kind| self.providers.last_known_fix(*kind))
            .collect()
    }

    /// A fix was accepted; the GPS backup is no longer needed.
    pub fn on_fix_accepted(&mut self) {
        if !self.backup_active {
            return;
        }
        if self.try_deactivate(ProviderKind::Gps) {
            self.backup_active = false;
        }
    }

    /// A candidate was not accepted; seek a fresher reading if the trusted
    /// fix has gone stale.
    pub fn on_fix_not_accepted(&mut self, trusted_is_stale: bool) {
        if !trusted_is_stale || self.backup_active {
            return;
        }
        if self.primary == Some(ProviderKind::Gps) {
            debug!("event=backup_activate module=tracking status=skip reason=gps_is_primary");
            return;
        }
        if !self.providers.is_available(ProviderKind::Gps) {
            debug!("event=backup_activate module=tracking status=skip reason=gps_unavailable");
            return;
        }
        self.backup_active = self.try_activate(ProviderKind::Gps);
    }

    /// Deactivates every listener and resets to `NoSource`.
    pub fn stop(&mut self) {
        if self.backup_active {
            self.try_deactivate(ProviderKind::Gps);
        }
        if let Some(kind) = self.primary {
            self.try_deactivate(kind);
        }
        if self.passive_active {
            self.try_deactivate(ProviderKind::Passive);
        }
        self.primary = None;
        self.backup_active = false;
        self.passive_active = false;
        info!("event=providers_stop module=tracking status=ok");
    }

    fn try_activate(&mut self, kind: ProviderKind) -> bool {
        match self.providers.activate(kind) {
            Ok(()) => {
                info!(
                    "event=provider_activate module=tracking status=ok provider={}",
                    kind.label()
                );
                true
            }
            Err(err) => {
                warn!(
                    "event=provider_activate module=tracking status=error provider={} error={err}",
                    kind.label()
                );
                false
            }
        }
    }

    fn try_deactivate(&mut self, kind: ProviderKind) -> bool {
        match self.providers.deactivate(kind) {
            Ok(()) => {
                info!(
                    "event=provider_deactivate module=tracking status=ok provider={}",
                    kind.label()
                );
                true
            }
            Err(err) => {
                warn!(
                    "event=provider_deactivate module=tracking status=error provider={} error={err}",
                    kind.label()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CoordinatorState, LocationProviders, ProviderCoordinator, ProviderError, ProviderKind,
    };
    use crate::model::fix::Fix;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeProviders {
        available: HashSet<ProviderKind>,
        denied: HashSet<ProviderKind>,
        active: HashSet<ProviderKind>,
        activations: Vec<ProviderKind>,
        last_known: Option<Fix>,
    }

    impl FakeProviders {
        fn with(kinds: &[ProviderKind]) -> Self {
            Self {
                available: kinds.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl LocationProviders for FakeProviders {
        fn is_available(&self, kind: ProviderKind) -> bool {
            self.available.contains(&kind)
        }

        fn activate(&mut self, kind: ProviderKind) -> Result<(), ProviderError> {
            if self.denied.contains(&kind) {
                return Err(ProviderError::PermissionDenied(kind));
            }
            self.activations.push(kind);
            self.active.insert(kind);
            Ok(())
        }

        fn deactivate(&mut self, kind: ProviderKind) -> Result<(), ProviderError> {
            self.active.remove(&kind);
            Ok(())
        }

        fn last_known_fix(&self, kind: ProviderKind) -> Option<Fix> {
            (kind == ProviderKind::Network).then_some(self.last_known).flatten()
        }
    }

    #[test]
    fn start_prefers_network_and_adds_passive() {
        let mut coordinator = ProviderCoordinator::new(FakeProviders::with(&[
            ProviderKind::Network,
            ProviderKind::Gps,
            ProviderKind::Passive,
        ]));
        coordinator.start();

        assert_eq!(coordinator.state(), CoordinatorState::PrimaryActive);
        assert_eq!(coordinator.primary(), Some(ProviderKind::Network));
        assert!(coordinator.is_passive_active());
        assert!(!coordinator.providers().active.contains(&ProviderKind::Gps));
    }

    #[test]
    fn start_falls_back_to_gps_when_network_is_denied() {
        let mut providers = FakeProviders::with(&[ProviderKind::Network, ProviderKind::Gps]);
        providers.denied.insert(ProviderKind::Network);
        let mut coordinator = ProviderCoordinator::new(providers);
        coordinator.start();

        assert_eq!(coordinator.primary(), Some(ProviderKind::Gps));
        assert!(!coordinator.is_passive_active());
    }

    #[test]
    fn start_without_sources_stays_in_no_source() {
        let mut coordinator = ProviderCoordinator::new(FakeProviders::default());
        assert!(coordinator.start().is_empty());
        assert_eq!(coordinator.state(), CoordinatorState::NoSource);
    }

    #[test]
    fn start_is_idempotent_and_returns_last_known_once() {
        let mut providers = FakeProviders::with(&[ProviderKind::Network]);
        providers.last_known = Some(Fix::new(1.0, 2.0, Some(10.0), 5).unwrap());
        let mut coordinator = ProviderCoordinator::new(providers);

        assert_eq!(coordinator.start().len(), 1);
        assert!(coordinator.start().is_empty());
        assert_eq!(coordinator.providers().activations, vec![ProviderKind::Network]);
    }

    #[test]
    fn stale_rejection_activates_backup_until_next_acceptance() {
        let mut coordinator = ProviderCoordinator::new(FakeProviders::with(&[
            ProviderKind::Network,
            ProviderKind::Gps,
        ]));
        coordinator.start();

        coordinator.on_fix_not_accepted(false);
        assert_eq!(coordinator.state(), CoordinatorState::PrimaryActive);

        coordinator.on_fix_not_accepted(true);
        coordinator.on_fix_not_accepted(true);
        assert_eq!(
            coordinator.state(),
            CoordinatorState::PrimaryActiveBackupActive
        );
        let gps_activations = coordinator
            .providers()
            .activations
            .iter()
            .filter(|kind| **kind == ProviderKind::Gps)
            .count();
        assert_eq!(gps_activations, 1);

        coordinator.on_fix_accepted();
        assert_eq!(coordinator.state(), CoordinatorState::PrimaryActive);
        assert!(!coordinator.providers().active.contains(&ProviderKind::Gps));
    }

    #[test]
    fn denied_backup_leaves_state_unchanged() {
        let mut providers = FakeProviders::with(&[ProviderKind::Network, ProviderKind::Gps]);
        providers.denied.insert(ProviderKind::Gps);
        let mut coordinator = ProviderCoordinator::new(providers);
        coordinator.start();

        coordinator.on_fix_not_accepted(true);
        assert_eq!(coordinator.state(), CoordinatorState::PrimaryActive);
    }

    #[test]
    fn stop_deactivates_everything() {
        let mut coordinator = ProviderCoordinator::new(FakeProviders::with(&[
            ProviderKind::Network,
            ProviderKind::Gps,
            ProviderKind::Passive,
        ]));
        coordinator.start();
        coordinator.on_fix_not_accepted(true);
        coordinator.stop();

        assert_eq!(coordinator.state(), CoordinatorState::NoSource);
        assert!(coordinator.providers().active.is_empty());
    }
}
