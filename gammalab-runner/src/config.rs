//! Serializable run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gammalab_core::engine::EngineConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid run setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Engine(#[from] gammalab_core::engine::ConfigError),
}

/// Everything needed to reproduce a run, minus the bar data itself.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Multiplier applied to the per-trade Sharpe ratio.
    pub annualization_factor: f64,

    pub engine: EngineConfig,

    /// Random-walk parameters used when no CSV is given.
    pub synthetic: SyntheticConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            annualization_factor: 252.0_f64.sqrt(),
            engine: EngineConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Deterministic random-walk generator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticConfig {
    pub start_date: NaiveDate,
    /// Number of weekday bars to generate.
    pub bars: usize,
    pub start_price: f64,
    /// Max absolute daily return; returns are drawn uniformly in ±this.
    pub daily_move: f64,
    /// Pull toward `start_price` per bar, as a fraction of the gap.
    pub mean_reversion: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            bars: 504,
            start_price: 100.0,
            daily_move: 0.01,
            mean_reversion: 0.05,
        }
    }
}

impl RunConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, RunConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, RunConfigError> {
        toml::to_string_pretty(self).map_err(|e| RunConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.engine.validate()?;
        if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
            return Err(RunConfigError::Invalid(format!(
                "annualization_factor must be positive, got {}",
                self.annualization_factor
            )));
        }
        let s = &self.synthetic;
        if !(s.start_price.is_finite() && s.start_price > 0.0) {
            return Err(RunConfigError::Invalid(format!(
                "synthetic.start_price must be positive, got {}",
                s.start_price
            )));
        }
        if !(0.0..1.0).contains(&s.daily_move) || !(0.0..=1.0).contains(&s.mean_reversion) {
            return Err(RunConfigError::Invalid(
                "synthetic.daily_move must be in [0, 1) and mean_reversion in [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, RunConfigError> {
        let json =
            serde_json::to_string(self).map_err(|e| RunConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
