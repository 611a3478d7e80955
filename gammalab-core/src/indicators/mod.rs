//! Rolling indicators and the per-bar `IndicatorSet` derived from them.
//!
//! Indicators are pure functions: bar history in, numeric series out. They are
//! precomputed once before the replay loop; the first `lookback()` values of
//! every series are `f64::NAN` (warm-up).
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod bollinger;
pub mod deriver;
pub mod realized_vol;
pub mod rsi;
pub mod sma;
pub mod synthetic;
pub mod vwap;

use crate::domain::Bar;

pub use bollinger::{BandSeries, Bollinger};
pub use deriver::{IndicatorDeriver, IndicatorParams, IndicatorSet};
pub use realized_vol::RealizedVolatility;
pub use rsi::Rsi;
pub use sma::{Sma, SmaSource};
pub use synthetic::synthetic_greeks;
pub use vwap::Vwap;

/// A single-series indicator.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "vwap").
    fn name(&self) -> &str;

    /// Number of leading bars that are `NaN`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev close, high/low = ±1 around the body, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let volumes = vec![1000.0; closes.len()];
    make_bars_with_volume(closes, &volumes)
}

#[cfg(test)]
pub fn make_bars_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
