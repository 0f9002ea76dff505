//! Geographic primitives: radius units and great-circle distance.
//!
//! Pure functions only; no state and no storage access.

pub mod distance;
pub mod units;
