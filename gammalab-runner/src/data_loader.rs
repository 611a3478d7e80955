//! Bar loading for the runner.
//!
//! Two sources:
//! 1. CSV file with `timestamp,open,high,low,close,volume` columns
//! 2. Deterministic synthetic random walk (`--synthetic NAME`)
//!
//! Every bar passes `Bar` validation and the series must be strictly
//! increasing in time; the first offending row aborts the load.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use gammalab_core::domain::{check_ordering, Bar, DataError};

use crate::config::SyntheticConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no bars in {0}")]
    Empty(String),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    Csv { path: PathBuf },
    Synthetic { seed_name: String },
}

/// A loaded, validated bar series.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub name: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
    /// BLAKE3 over all bar data, for fingerprinting.
    pub dataset_hash: String,
}

impl LoadedData {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, DataSource::Synthetic { .. })
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "date", alias = "Date", alias = "Timestamp")]
    timestamp: Option<String>,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume")]
    volume: Option<f64>,
}

/// Load a CSV file of bars.
pub fn load_csv(path: &Path) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_csv(file)?;
    if bars.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(path = %path.display(), bars = bars.len(), "loaded CSV");
    Ok(LoadedData {
        dataset_hash: dataset_hash(&bars),
        name,
        bars,
        source: DataSource::Csv {
            path: path.to_path_buf(),
        },
    })
}

/// Parse bars from any CSV reader. Row numbers in errors are zero-based
/// data rows (the header is not counted).
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        bars.push(row_to_bar(row, record)?);
    }
    check_ordering(&bars)?;
    Ok(bars)
}

fn row_to_bar(row: usize, record: CsvRow) -> Result<Bar, DataError> {
    let field = |value: Option<f64>, name: &'static str| {
        value.ok_or(DataError::MissingField { row, field: name })
    };
    let raw_ts = record
        .timestamp
        .filter(|s| !s.is_empty())
        .ok_or(DataError::MissingField {
            row,
            field: "timestamp",
        })?;
    let timestamp = parse_timestamp(&raw_ts).ok_or_else(|| DataError::BadTimestamp {
        row,
        value: raw_ts.clone(),
    })?;
    Bar::new(
        row,
        timestamp,
        field(record.open, "open")?,
        field(record.high, "high")?,
        field(record.low, "low")?,
        field(record.close, "close")?,
        field(record.volume, "volume")?,
    )
}

/// Accepted formats: RFC 3339 (converted to UTC), `%Y-%m-%d %H:%M:%S`,
/// `%Y-%m-%dT%H:%M:%S`, and a bare `%Y-%m-%d` (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Generate a deterministic synthetic series for `name`.
///
/// Weekday bars at 16:00, a mean-reverting random walk around
/// `start_price`. Same name and config always give the same bars.
pub fn generate_synthetic(name: &str, config: &SyntheticConfig) -> LoadedData {
    warn!(name, "generating synthetic data, results are not from market prices");
    let bars = generate_synthetic_bars(name, config);
    LoadedData {
        name: name.to_string(),
        dataset_hash: dataset_hash(&bars),
        bars,
        source: DataSource::Synthetic {
            seed_name: name.to_string(),
        },
    }
}

fn generate_synthetic_bars(name: &str, config: &SyntheticConfig) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from the dataset name
    let seed: [u8; 32] = *blake3::hash(name.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(config.bars);
    let mut price = config.start_price;
    let mut day = config.start_date;

    while bars.len() < config.bars {
        let weekday = day.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            day += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = if config.daily_move > 0.0 {
            rng.gen_range(-config.daily_move..config.daily_move)
        } else {
            0.0
        };
        let open = price;
        let pull = (config.start_price - price) * config.mean_reversion;
        let close = (price * (1.0 + daily_return) + pull).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        // 16:00 is always a valid time of day.
        let timestamp = day.and_hms_opt(16, 0, 0).unwrap_or_default();
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        day += chrono::Duration::days(1);
    }
    bars
}

/// Deterministic BLAKE3 hash over timestamps and OHLCV values.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
