//! Run summary export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use gammalab_core::engine::{SkipReason, Termination};

use crate::data_loader::DataSource;
use crate::metrics::PerformanceSummary;
use crate::runner::DatasetResult;

/// Everything about a run except the per-bar and per-trade series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub dataset: String,
    pub dataset_hash: String,
    pub source: DataSource,
    pub bars_processed: usize,
    pub warmup_bars: usize,
    pub skipped_warmup: usize,
    pub skipped_undefined: usize,
    pub skipped_invalid_input: usize,
    pub hedge_adjustments: usize,
    pub termination: Termination,
    pub performance: PerformanceSummary,
}

impl RunManifest {
    pub fn from_result(result: &DatasetResult) -> Self {
        let report = &result.report;
        Self {
            run_id: result.run_id.clone(),
            dataset: result.dataset.clone(),
            dataset_hash: result.dataset_hash.clone(),
            source: result.source.clone(),
            bars_processed: report.bars_processed,
            warmup_bars: report.warmup_bars,
            skipped_warmup: report.skipped_with(SkipReason::WarmUp),
            skipped_undefined: report.skipped_with(SkipReason::UndefinedSignal),
            skipped_invalid_input: report.skipped_with(SkipReason::InvalidGreeksInput),
            hedge_adjustments: report.hedge_adjustments,
            termination: report.termination,
            performance: result.summary.clone(),
        }
    }
}

pub fn write_summary(path: &Path, result: &DatasetResult) -> Result<()> {
    let manifest = RunManifest::from_result(result);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}
