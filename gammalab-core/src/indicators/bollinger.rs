//! Bollinger Bands — SMA(close) ± k · population stddev(close).
//!
//! `bands` computes all three in one pass for the deriver; the single-series
//! `Indicator` view is the middle band. Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// All three bands over a series.
#[derive(Debug, Clone, Default)]
pub struct BandSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }

    /// Compute upper, middle and lower together.
    pub fn bands(&self, bars: &[Bar]) -> BandSeries {
        let period = self.period;
        let n = bars.len();
        let mut out = BandSeries {
            upper: vec![f64::NAN; n],
            middle: vec![f64::NAN; n],
            lower: vec![f64::NAN; n],
        };
        if n < period {
            return out;
        }

        for i in (period - 1)..n {
            let window = &bars[i + 1 - period..=i];
            if window.iter().any(|b| b.close.is_nan()) {
                continue;
            }
            let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|b| (b.close - mean).powi(2))
                .sum::<f64>()
                / period as f64;
            let width = self.multiplier * variance.sqrt();
            out.middle[i] = mean;
            out.upper[i] = mean + width;
            out.lower[i] = mean - width;
        }
        out
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.bands(bars).middle
    }
}
