//! Artifact export for finished runs.

pub mod artifacts;

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
