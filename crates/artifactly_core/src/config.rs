//! User preferences consumed by the tracking engine.
//!
//! # Responsibility
//! - Hold the search radius, its unit and the sound-on-notification flag.
//! - Enforce preference bounds at write time.
//!
//! # Invariants
//! - `radius` always lies in `[RADIUS_MIN, RADIUS_MAX]`.
//! - The engine reads a copied snapshot per fix; writers never block a fix
//!   evaluation for longer than one struct copy.

use crate::geo::units::{to_meters, RadiusUnit};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

pub const RADIUS_DEFAULT: u32 = 2000;
pub const RADIUS_MIN: u32 = 1;
pub const RADIUS_MAX: u32 = 20000;

/// Preferences handle shared between the host and the tracking worker.
pub type SharedPreferences = Arc<RwLock<Preferences>>;

/// Injected user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    radius: u32,
    radius_unit: RadiusUnit,
    sound_notification: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            radius: RADIUS_DEFAULT,
            radius_unit: RadiusUnit::Meters,
            sound_notification: true,
        }
    }
}

impl Preferences {
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn radius_unit(&self) -> RadiusUnit {
        self.radius_unit
    }

    pub fn sound_notification(&self) -> bool {
        self.sound_notification
    }

    /// Search radius converted to meters.
    pub fn radius_meters(&self) -> u32 {
        to_meters(self.radius, self.radius_unit)
    }

    /// Sets the search radius.
    ///
    /// # Errors
    /// - `RadiusOutOfRange` when `radius` is outside `[1, 20000]`; the current
    ///   value is kept.
    pub fn set_radius(&mut self, radius: u32) -> Result<(), ValidationError> {
        if !(RADIUS_MIN..=RADIUS_MAX).contains(&radius) {
            return Err(ValidationError::RadiusOutOfRange {
                value: radius,
                min: RADIUS_MIN,
                max: RADIUS_MAX,
            });
        }
        self.radius = radius;
        Ok(())
    }

    pub fn set_radius_unit(&mut self, unit: RadiusUnit) {
        self.radius_unit = unit;
    }

    pub fn set_sound_notification(&mut self, enabled: bool) {
        self.sound_notification = enabled;
    }

    /// Clamps values loaded from an external source back into bounds.
    pub fn sanitized(mut self) -> Self {
        self.radius = self.radius.clamp(RADIUS_MIN, RADIUS_MAX);
        self
    }

    pub fn into_shared(self) -> SharedPreferences {
        Arc::new(RwLock::new(self))
    }
}

/// Reads a snapshot, falling back to defaults if a writer panicked.
pub fn snapshot(shared: &SharedPreferences) -> Preferences {
    match shared.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}
