//! Bar — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error for malformed market data.
///
/// Any of these aborts the replay of the dataset that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: field '{field}' has invalid value {value}")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("row {row}: high {high} is below low {low}")]
    InvertedRange { row: usize, high: f64, low: f64 },

    #[error("row {row}: timestamp '{value}' could not be parsed")]
    BadTimestamp { row: usize, value: String },

    #[error("bar {index}: timestamp {timestamp} is not after previous {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
}

/// OHLCV bar.
///
/// Construct through [`Bar::new`] to get field validation; the public fields
/// stay readable for indicator code and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Validated constructor. `row` is only used to locate the error.
    pub fn new(
        row: usize,
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, DataError> {
        let bar = Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        };
        bar.validate(row)?;
        Ok(bar)
    }

    /// Prices and volume finite and non-negative, close positive, high >= low.
    pub fn validate(&self, row: usize) -> Result<(), DataError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DataError::InvalidValue { row, field, value });
            }
        }
        if self.close == 0.0 {
            return Err(DataError::InvalidValue {
                row,
                field: "close",
                value: self.close,
            });
        }
        if self.high < self.low {
            return Err(DataError::InvertedRange {
                row,
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }
}

/// Verify every bar is valid and timestamps strictly increase.
pub fn check_series(bars: &[Bar]) -> Result<(), DataError> {
    for (row, bar) in bars.iter().enumerate() {
        bar.validate(row)?;
    }
    check_ordering(bars)
}

/// Verify a bar series is strictly increasing in time.
pub fn check_ordering(bars: &[Bar]) -> Result<(), DataError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(DataError::OutOfOrder {
                index: index + 1,
                timestamp: pair[1].timestamp,
                previous: pair[0].timestamp,
            });
        }
    }
    Ok(())
}
