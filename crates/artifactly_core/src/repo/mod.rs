//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service and tracking orchestration.
//!
//! # Invariants
//! - Repository writes receive already-validated domain values.
//! - Repository APIs return semantic errors (`NotFound`, `Collision`) in
//!   addition to DB transport errors.

pub mod artifact_repo;
