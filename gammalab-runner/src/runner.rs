//! Replay runner — wires together loading, the core replay driver and metrics.
//!
//! Entry points:
//! - `run_dataset()`: one loaded dataset, no I/O.
//! - `run_specs()`: load and replay several datasets in parallel. Used by CLI.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use gammalab_core::engine::{ReplayDriver, ReplayError, ReplayReport};

use crate::config::{RunConfig, RunConfigError, RunId};
use crate::data_loader::{generate_synthetic, load_csv, DataSource, LoadError, LoadedData};
use crate::metrics::PerformanceSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] RunConfigError),

    #[error("failed to load '{dataset}': {source}")]
    Load {
        dataset: String,
        #[source]
        source: LoadError,
    },

    #[error("replay of '{dataset}' failed: {source}")]
    Replay {
        dataset: String,
        #[source]
        source: ReplayError,
    },

    #[error("export failed: {0:#}")]
    Export(anyhow::Error),
}

/// A dataset to run, before loading.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSpec {
    Csv(PathBuf),
    Synthetic(String),
}

impl DatasetSpec {
    pub fn label(&self) -> String {
        match self {
            DatasetSpec::Csv(path) => path.display().to_string(),
            DatasetSpec::Synthetic(name) => name.clone(),
        }
    }

    pub fn load(&self, config: &RunConfig) -> Result<LoadedData, RunError> {
        match self {
            DatasetSpec::Csv(path) => load_csv(path).map_err(|source| RunError::Load {
                dataset: self.label(),
                source,
            }),
            DatasetSpec::Synthetic(name) => Ok(generate_synthetic(name, &config.synthetic)),
        }
    }
}

/// Complete result of replaying one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetResult {
    pub run_id: RunId,
    pub dataset: String,
    pub dataset_hash: String,
    pub source: DataSource,
    pub report: ReplayReport,
    pub summary: PerformanceSummary,
}

/// Replay one loaded dataset. No I/O.
pub fn run_dataset(config: &RunConfig, data: &LoadedData) -> Result<DatasetResult, RunError> {
    let run_id = config.run_id()?;
    let driver = ReplayDriver::new(config.engine.clone()).map_err(RunConfigError::from)?;
    let report = driver.run(&data.bars).map_err(|source| RunError::Replay {
        dataset: data.name.clone(),
        source,
    })?;
    let summary = PerformanceSummary::compute(
        &report.trades,
        report.initial_balance,
        config.annualization_factor,
    );

    info!(
        dataset = %data.name,
        trades = summary.total_trades,
        total_pnl = summary.total_pnl,
        win_rate = summary.win_rate,
        "dataset complete"
    );

    Ok(DatasetResult {
        run_id,
        dataset: data.name.clone(),
        dataset_hash: data.dataset_hash.clone(),
        source: data.source.clone(),
        report,
        summary,
    })
}

/// Load and replay every spec in parallel, one driver per dataset.
///
/// Results come back in input order; one failing dataset does not stop
/// the others.
pub fn run_specs(config: &RunConfig, specs: &[DatasetSpec]) -> Vec<Result<DatasetResult, RunError>> {
    specs
        .par_iter()
        .map(|spec| spec.load(config).and_then(|data| run_dataset(config, &data)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyntheticConfig;

    fn small_config() -> RunConfig {
        RunConfig {
            synthetic: SyntheticConfig {
                bars: 120,
                ..SyntheticConfig::default()
            },
            ..RunConfig::default()
        }
    }

    #[test]
    fn synthetic_dataset_runs() {
        let config = small_config();
        let data = DatasetSpec::Synthetic("SPY".into()).load(&config).unwrap();
        let result = run_dataset(&config, &data).unwrap();
        assert_eq!(result.report.bars_processed, 120);
        assert_eq!(result.summary.total_trades, result.report.trades.len());
        assert!(
            (result.summary.final_balance - result.report.final_balance).abs() < 1e-6,
            "summary and report disagree on final balance"
        );
    }

    #[test]
    fn parallel_results_match_sequential() {
        let config = small_config();
        let specs: Vec<DatasetSpec> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| DatasetSpec::Synthetic(n.to_string()))
            .collect();
        let parallel = run_specs(&config, &specs);
        for (spec, result) in specs.iter().zip(parallel) {
            let data = spec.load(&config).unwrap();
            let sequential = run_dataset(&config, &data).unwrap();
            let result = result.unwrap();
            assert_eq!(result.dataset, sequential.dataset);
            assert_eq!(result.report, sequential.report);
        }
    }

    #[test]
    fn missing_csv_is_load_error() {
        let config = small_config();
        let results = run_specs(&config, &[DatasetSpec::Csv("/nonexistent/bars.csv".into())]);
        assert!(matches!(results[0], Err(RunError::Load { .. })));
    }
}
