//! Simple Moving Average (SMA) of close or volume.
//!
//! Lookback: period - 1 (first valid value at index period-1). A NaN anywhere
//! in the window makes that window's value NaN.

use super::Indicator;
use crate::domain::Bar;

/// Which bar field the average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmaSource {
    Close,
    Volume,
}

impl SmaSource {
    fn read(self, bar: &Bar) -> f64 {
        match self {
            SmaSource::Close => bar.close,
            SmaSource::Volume => bar.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: SmaSource,
    name: String,
}

impl Sma {
    pub fn new(period: usize, source: SmaSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let prefix = match source {
            SmaSource::Close => "sma",
            SmaSource::Volume => "volume_sma",
        };
        Self {
            period,
            source,
            name: format!("{prefix}_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        let mut sum = 0.0;
        let mut nan_count = 0usize;

        for i in 0..n {
            let entering = self.source.read(&bars[i]);
            if entering.is_nan() {
                nan_count += 1;
            } else {
                sum += entering;
            }

            if i >= self.period {
                let leaving = self.source.read(&bars[i - self.period]);
                if leaving.is_nan() {
                    nan_count -= 1;
                } else {
                    sum -= leaving;
                }
            }

            if i + 1 >= self.period && nan_count == 0 {
                result[i] = sum / self.period as f64;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_bars_with_volume};

    #[test]
    fn sma_close_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5, SmaSource::Close).compute(&bars);
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert_approx(result[4], 12.0, 1e-9);
        assert_approx(result[5], 13.0, 1e-9);
        assert_approx(result[6], 14.0, 1e-9);
    }

    #[test]
    fn sma_volume() {
        let bars = make_bars_with_volume(&[1.0, 1.0, 1.0, 1.0], &[100.0, 200.0, 300.0, 600.0]);
        let result = Sma::new(2, SmaSource::Volume).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 150.0, 1e-9);
        assert_approx(result[3], 450.0, 1e-9);
        assert_eq!(Sma::new(20, SmaSource::Volume).name(), "volume_sma_20");
    }

    #[test]
    fn sma_nan_propagation() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].close = f64::NAN;
        let result = Sma::new(3, SmaSource::Close).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, 1e-9);
    }

    #[test]
    fn sma_too_few_bars() {
        let bars = make_bars(&[10.0, 11.0]);
        let result = Sma::new(5, SmaSource::Close).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20, SmaSource::Close).lookback(), 19);
        assert_eq!(Sma::new(1, SmaSource::Close).lookback(), 0);
    }
}
