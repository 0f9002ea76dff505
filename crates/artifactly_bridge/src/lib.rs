//! Host-facing request/response surface for the Artifactly core.

pub mod api;

pub use api::{
    core_version, init_logging, ping, ArtifactlyBridge, BridgeConfig, CreateArtifactResponse,
};
