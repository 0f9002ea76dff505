//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep bridge and tracking layers decoupled from storage details.

pub mod artifact_service;
