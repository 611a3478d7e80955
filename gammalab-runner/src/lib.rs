//! GammaLab Runner — configuration, bar loading, metrics and artifacts.
//!
//! This crate builds on `gammalab-core` to provide:
//! - TOML run configuration with a deterministic run id
//! - CSV and synthetic bar loading
//! - Performance summary over closed trades
//! - Parallel multi-dataset runs
//! - Artifact export (trades, equity curve, summary)

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;

pub use config::{RunConfig, RunConfigError, RunId, SyntheticConfig};
pub use data_loader::{
    dataset_hash, generate_synthetic, load_csv, parse_timestamp, read_csv, DataSource, LoadError,
    LoadedData,
};
pub use metrics::PerformanceSummary;
pub use reporting::{ArtifactManager, ArtifactPaths, RunManifest};
pub use runner::{run_dataset, run_specs, DatasetResult, DatasetSpec, RunError};
