//! Annualized realized volatility of close-to-close log returns.
//!
//! σ[t] = population stddev of ln(close[i]/close[i-1]) over the last `window`
//! returns, times sqrt(periods_per_year). Lookback: window.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct RealizedVolatility {
    window: usize,
    periods_per_year: f64,
    name: String,
}

impl RealizedVolatility {
    pub fn new(window: usize, periods_per_year: f64) -> Self {
        assert!(window >= 2, "realized volatility window must be >= 2");
        Self {
            window,
            periods_per_year,
            name: format!("realized_vol_{window}"),
        }
    }
}

impl Indicator for RealizedVolatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.window {
            return result;
        }

        let returns: Vec<f64> = std::iter::once(f64::NAN)
            .chain(bars.windows(2).map(|w| (w[1].close / w[0].close).ln()))
            .collect();
        let annualize = self.periods_per_year.sqrt();

        for i in self.window..n {
            let window = &returns[i + 1 - self.window..=i];
            if window.iter().any(|r| !r.is_finite()) {
                continue;
            }
            let mean = window.iter().sum::<f64>() / self.window as f64;
            let variance =
                window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / self.window as f64;
            result[i] = variance.sqrt() * annualize;
        }
        result
    }
}
