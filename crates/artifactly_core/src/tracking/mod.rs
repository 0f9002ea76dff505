//! Location tracking engine.
//!
//! # Responsibility
//! - Arbitrate incoming fixes against the trusted fix.
//! - Coordinate which position sources are listening.
//! - Decide when nearby artifacts raise or clear a notification.
//! - Run all of the above serially on one worker thread.

pub mod arbiter;
pub mod coordinator;
pub mod notifier;
pub mod service;
pub mod worker;
