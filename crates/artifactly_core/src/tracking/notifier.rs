//! Proximity notification throttling.
//!
//! # Responsibility
//! - Decide, per accepted fix, whether to raise or clear the notification.
//! - Throttle banner and sound independently.
//!
//! # Invariants
//! - At most one `Notify` per `NOTIFICATION_INTERVAL_MS`.
//! - Sound at most once per `SOUND_INTERVAL_MS`, and only when enabled.
//! - An empty nearby set always clears.

use crate::model::artifact::LocationArtifacts;

pub const NOTIFICATION_INTERVAL_MS: i64 = 60_000;
pub const SOUND_INTERVAL_MS: i64 = 300_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierAction {
    Notify { sound: bool },
    Clear,
    /// Artifacts are nearby but the banner throttle has not elapsed.
    Suppressed,
}

/// Host-side renderer for notification events.
pub trait NotificationSink: Send {
    /// Raises the "artifacts nearby" notification.
    fn notify(&mut self, nearby: &[LocationArtifacts], sound: bool);
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct ProximityNotifier {
    last_notification_at_ms: Option<i64>,
    last_sound_at_ms: Option<i64>,
}

impl ProximityNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses the action for one nearby-scan result and records it.
    pub fn evaluate(&mut self, nearby_count: usize, sound_enabled: bool, now_ms: i64) -> NotifierAction {
        if nearby_count == 0 {
            return NotifierAction::Clear;
        }
        if !elapsed(self.last_notification_at_ms, now_ms, NOTIFICATION_INTERVAL_MS) {
            return NotifierAction::Suppressed;
        }

        self.last_notification_at_ms = Some(now_ms);
        let sound = sound_enabled && elapsed(self.last_sound_at_ms, now_ms, SOUND_INTERVAL_MS);
        if sound {
            self.last_sound_at_ms = Some(now_ms);
        }
        NotifierAction::Notify { sound }
    }

    pub fn reset(&mut self) {
        self.last_notification_at_ms = None;
        self.last_sound_at_ms = None;
    }
}

fn elapsed(last_ms: Option<i64>, now_ms: i64, interval_ms: i64) -> bool {
    last_ms.map_or(true, |last| now_ms - last >= interval_ms)
}

#[cfg(test)]
mod tests {
    use super::{NotifierAction, ProximityNotifier};

    #[test]
    fn notifications_within_a_minute_are_suppressed() {
        let mut notifier = ProximityNotifier::new();
        assert_eq!(
            notifier.evaluate(2, true, 1_000),
            NotifierAction::Notify { sound: true }
        );
        assert_eq!(notifier.evaluate(2, true, 60_999), NotifierAction::Suppressed);
        assert_eq!(
            notifier.evaluate(1, true, 61_000),
            NotifierAction::Notify { sound: false }
        );
    }

    #[test]
    fn sound_is_throttled_separately() {
        let mut notifier = ProximityNotifier::new();
        notifier.evaluate(1, true, 0);
        assert_eq!(
            notifier.evaluate(1, true, 240_000),
            NotifierAction::Notify { sound: false }
        );
        assert_eq!(
            notifier.evaluate(1, true, 300_000),
            NotifierAction::Notify { sound: true }
        );
    }

    #[test]
    fn disabled_sound_does_not_consume_sound_window() {
        let mut notifier = ProximityNotifier::new();
        assert_eq!(
            notifier.evaluate(1, false, 0),
            NotifierAction::Notify { sound: false }
        );
        assert_eq!(
            notifier.evaluate(1, true, 60_000),
            NotifierAction::Notify { sound: true }
        );
    }

    #[test]
    fn empty_result_always_clears() {
        let mut notifier = ProximityNotifier::new();
        notifier.evaluate(1, true, 0);
        assert_eq!(notifier.evaluate(0, true, 1), NotifierAction::Clear);
        assert_eq!(notifier.evaluate(0, true, 2), NotifierAction::Clear);
        assert_eq!(notifier.evaluate(1, true, 3), NotifierAction::Suppressed);
    }
}
