//! Cumulative VWAP from the start of the series.
//!
//! VWAP[t] = Σ close·volume / Σ volume over bars 0..=t. Not a rolling window:
//! every prior bar stays in the average. NaN until cumulative volume is
//! positive; a NaN bar poisons every later value.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut price_volume = 0.0;
        let mut volume = 0.0;
        bars.iter()
            .map(|bar| {
                price_volume += bar.close * bar.volume;
                volume += bar.volume;
                if volume > 0.0 {
                    price_volume / volume
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}
