//! Artifact manager for persisting run outputs.

mod equity;
mod manifest;
mod trades;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::DatasetResult;

pub use manifest::RunManifest;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub summary_json: PathBuf,
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Directory a dataset's artifacts land in: `<dataset>-<run_id prefix>`.
    pub fn run_dir(&self, result: &DatasetResult) -> PathBuf {
        let prefix: String = result.run_id.chars().take(12).collect();
        self.output_dir
            .join(format!("{}-{prefix}", sanitize(&result.dataset)))
    }

    /// Save complete run artifacts.
    pub fn save_run(&self, result: &DatasetResult) -> Result<ArtifactPaths> {
        let run_dir = self.run_dir(result);
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;

        let summary_json = run_dir.join("summary.json");
        manifest::write_summary(&summary_json, result)?;

        let equity_csv = run_dir.join("equity.csv");
        equity::write_equity_csv(&equity_csv, &result.report.equity_curve)?;

        let trades_csv = run_dir.join("trades.csv");
        let trades_json = run_dir.join("trades.json");
        trades::write_trades_csv(&trades_csv, &result.report.trades)?;
        trades::write_trades_json(&trades_json, &result.report.trades)?;

        Ok(ArtifactPaths {
            run_dir,
            summary_json,
            equity_csv,
            trades_csv,
            trades_json,
        })
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
