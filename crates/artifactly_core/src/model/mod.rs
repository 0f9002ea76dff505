//! Domain model for place-bound notes and observed positions.
//!
//! # Responsibility
//! - Define the records shared by the store, the tracking engine and callers.
//! - Own caller-input validation so invalid values never reach storage.
//!
//! # Invariants
//! - Every persisted entity is identified by a stable UUID.
//! - Coordinates keep the caller's decimal-degree text verbatim.
//! - A `Fix` value is always a complete, in-range reading.

pub mod artifact;
pub mod fix;
pub mod location;
pub mod validation;
