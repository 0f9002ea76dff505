//! Trusted-fix arbitration.
//!
//! # Responsibility
//! - Decide whether a candidate fix replaces the trusted fix.
//! - Own the trusted fix and the time the last candidate was received.
//!
//! # Invariants
//! - The trusted fix is only replaced on `FixDecision::Accepted`.
//! - A candidate at zero distance from the trusted fix is ignored entirely.
//! - A missing accuracy never counts as "more accurate".

use crate::geo::distance::distance_m;
use crate::model::fix::Fix;

/// Coarsest accuracy (meters) still usable as a fallback reading.
pub const MAX_ACCURACY_M: f32 = 2000.0;
/// Window (ms) in which an older but more accurate fix may still win.
pub const ALLOWED_TIME_DELTA_MS: i64 = 300_000;

/// Outcome of one `consider` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixDecision {
    /// Candidate became the trusted fix.
    Accepted,
    /// Candidate was evaluated and discarded.
    Rejected,
    /// Candidate repeats the trusted position; nothing was evaluated.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbiterConfig {
    pub max_accuracy_m: f32,
    pub allowed_time_delta_ms: i64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: MAX_ACCURACY_M,
            allowed_time_delta_ms: ALLOWED_TIME_DELTA_MS,
        }
    }
}

/// Holds the trusted fix and applies the acceptance heuristic.
#[derive(Debug, Default)]
pub struct FixArbiter {
    config: ArbiterConfig,
    trusted: Option<Fix>,
    last_candidate_at_ms: Option<i64>,
}

impl FixArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            config,
            trusted: None,
            last_candidate_at_ms: None,
        }
    }

    pub fn trusted(&self) -> Option<Fix> {
        self.trusted
    }

    /// Wall-clock time of the last non-duplicate candidate.
    pub fn last_candidate_at_ms(&self) -> Option<i64> {
        self.last_candidate_at_ms
    }

    /// Evaluates `candidate` against the trusted fix.
    ///
    /// `radius_m` is the current search radius; a candidate coarser than both
    /// it and the accuracy ceiling is rejected outright.
    pub fn consider(&mut self, candidate: Fix, radius_m: u32, now_ms: i64) -> FixDecision {
        if let Some(trusted) = self.trusted {
            if distance_m(trusted.position(), candidate.position()) == 0.0 {
                return FixDecision::Duplicate;
            }
        }

        self.last_candidate_at_ms = Some(now_ms);
        let decision = match self.trusted {
            None => FixDecision::Accepted,
            Some(trusted) if self.is_better(&trusted, &candidate, radius_m) => {
                FixDecision::Accepted
            }
            Some(_) => FixDecision::Rejected,
        };

        if decision == FixDecision::Accepted {
            self.trusted = Some(candidate);
        }
        decision
    }

    /// Returns whether the trusted fix is older than the allowed window.
    pub fn is_stale(&self, now_ms: i64) -> bool {
        match self.trusted {
            Some(trusted) => {
                now_ms.saturating_sub(trusted.time_ms()) > self.config.allowed_time_delta_ms
            }
            None => false,
        }
    }

    /// Drops the trusted fix; used on tracking teardown.
    pub fn reset(&mut self) {
        self.trusted = None;
        self.last_candidate_at_ms = None;
    }

    fn is_better(&self, trusted: &Fix, candidate: &Fix, radius_m: u32) -> bool {
        if let Some(accuracy) = candidate.accuracy_m() {
            if accuracy > radius_m as f32 && accuracy > self.config.max_accuracy_m {
                return false;
            }
        }

        let is_more_accurate = match (trusted.accuracy_m(), candidate.accuracy_m()) {
            (Some(held), Some(offered)) => held - offered >= 0.0,
            _ => false,
        };

        let time_delta = trusted.time_ms().saturating_sub(candidate.time_ms());
        let is_more_current = time_delta <= 0;
        if is_more_accurate && is_more_current {
            return true;
        }

        let is_slightly_less_current =
            time_delta > 0 && time_delta < self.config.allowed_time_delta_ms;
        if is_more_accurate && is_slightly_less_current {
            return true;
        }

        let is_slightly_less_accurate = candidate
            .accuracy_m()
            .is_some_and(|accuracy| accuracy <= self.config.max_accuracy_m);
        is_slightly_less_accurate && is_more_current
    }
}

#[cfg(test)]
mod tests {
    use super::{FixArbiter, FixDecision};
    use crate::model::fix::Fix;

    const RADIUS_M: u32 = 2000;

    fn fix(lat: f64, accuracy: Option<f32>, time_ms: i64) -> Fix {
        Fix::new(lat, 10.0, accuracy, time_ms).unwrap()
    }

    fn seeded(trusted: Fix) -> FixArbiter {
        let mut arbiter = FixArbiter::default();
        assert_eq!(arbiter.consider(trusted, RADIUS_M, 0), FixDecision::Accepted);
        arbiter
    }

    #[test]
    fn first_candidate_is_always_accepted() {
        let mut arbiter = FixArbiter::default();
        let first = fix(1.0, None, 5);
        assert_eq!(arbiter.consider(first, RADIUS_M, 5), FixDecision::Accepted);
        assert_eq!(arbiter.trusted(), Some(first));
    }

    #[test]
    fn more_accurate_and_more_current_is_accepted() {
        let mut arbiter = seeded(fix(1.0, Some(50.0), 1000));
        let candidate = fix(1.001, Some(30.0), 1100);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 1100), FixDecision::Accepted);
        assert_eq!(arbiter.trusted(), Some(candidate));
    }

    #[test]
    fn extreme_fix_times_do_not_overflow() {
        let trusted = fix(1.0, Some(50.0), 0);
        let mut arbiter = seeded(trusted);

        let ancient = fix(1.001, Some(10.0), i64::MIN);
        assert_eq!(arbiter.consider(ancient, RADIUS_M, 0), FixDecision::Rejected);
        assert_eq!(arbiter.trusted(), Some(trusted));
        assert!(arbiter.is_stale(i64::MAX));

        let far_future = fix(1.002, Some(10.0), i64::MAX);
        assert_eq!(arbiter.consider(far_future, RADIUS_M, 0), FixDecision::Accepted);
        assert!(!arbiter.is_stale(i64::MIN));
    }

    #[test]
    fn coarse_and_older_candidate_is_rejected() {
        let trusted = fix(1.0, Some(50.0), 1000);
        let mut arbiter = seeded(trusted);
        let candidate = fix(1.001, Some(3000.0), 900);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 1100), FixDecision::Rejected);
        assert_eq!(arbiter.trusted(), Some(trusted));
    }

    #[test]
    fn coarse_candidate_within_large_radius_is_not_rejected_early() {
        let mut arbiter = seeded(fix(1.0, Some(50.0), 1000));
        // Coarse but inside a 5 km radius; still loses on accuracy and time.
        let candidate = fix(1.001, Some(3000.0), 2000);
        assert_eq!(arbiter.consider(candidate, 5000, 2000), FixDecision::Rejected);
    }

    #[test]
    fn slightly_older_but_more_accurate_is_accepted() {
        let mut arbiter = seeded(fix(1.0, Some(50.0), 400_000));
        let candidate = fix(1.001, Some(20.0), 200_000);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 1), FixDecision::Accepted);
    }

    #[test]
    fn much_older_candidate_is_rejected_even_if_more_accurate() {
        let mut arbiter = seeded(fix(1.0, Some(50.0), 400_000));
        let candidate = fix(1.001, Some(20.0), 100_000);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 1), FixDecision::Rejected);
    }

    #[test]
    fn less_accurate_but_newer_within_ceiling_is_accepted() {
        let mut arbiter = seeded(fix(1.0, Some(20.0), 1000));
        let candidate = fix(1.001, Some(1500.0), 2000);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 2000), FixDecision::Accepted);
    }

    #[test]
    fn missing_accuracy_never_counts_as_more_accurate() {
        let mut arbiter = seeded(fix(1.0, Some(50.0), 1000));
        let candidate = fix(1.001, None, 1100);
        assert_eq!(arbiter.consider(candidate, RADIUS_M, 1100), FixDecision::Rejected);
    }

    #[test]
    fn zero_distance_candidate_is_duplicate_and_not_recorded() {
        let trusted = fix(1.0, Some(50.0), 1000);
        let mut arbiter = seeded(trusted);
        let repeat = fix(1.0, Some(5.0), 9000);
        assert_eq!(arbiter.consider(repeat, RADIUS_M, 9000), FixDecision::Duplicate);
        assert_eq!(arbiter.trusted(), Some(trusted));
        assert_eq!(arbiter.last_candidate_at_ms(), Some(0));
    }

    #[test]
    fn staleness_uses_trusted_fix_time() {
        let arbiter = seeded(fix(1.0, Some(50.0), 1000));
        assert!(!arbiter.is_stale(301_000));
        assert!(arbiter.is_stale(301_001));
        assert!(!FixArbiter::default().is_stale(i64::MAX));
    }
}
