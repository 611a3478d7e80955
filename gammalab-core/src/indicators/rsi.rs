//! Relative Strength Index (RSI), Wilder smoothing.
//!
//! Seed: simple mean of the first `period` gains and losses.
//! Then avg = (prev * (period - 1) + current) / period.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! First valid value at index `period`. A flat window reads 50.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.period {
            return result;
        }

        let period = self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                // A gap poisons the smoothed averages for the rest of the series.
                return result;
            }
            let (gain, loss) = (change.max(0.0), (-change).max(0.0));

            if i <= self.period {
                avg_gain += gain / period;
                avg_loss += loss / period;
            } else {
                avg_gain = (avg_gain * (period - 1.0) + gain) / period;
                avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            }

            if i >= self.period {
                result[i] = rsi_from_averages(avg_gain, avg_loss);
            }
        }

        result
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        (true, false) => 0.0,
        _ => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_fifty() {
        let bars = make_bars(&[100.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[4], 50.0, 1e-9);
    }

    #[test]
    fn rsi_seed_and_wilder_step() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Seed (period 3): gain 0.34/3, loss 0.73/3
        // Step: gain = (0.34/3*2 + 0.72)/3, loss = (0.73/3*2)/3
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[..3].iter().all(|v| v.is_nan()));

        let seed = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], seed, 1e-9);

        let gain = (0.34 / 3.0 * 2.0 + 0.72) / 3.0;
        let loss = (0.73 / 3.0 * 2.0) / 3.0;
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + gain / loss), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate().skip(3) {
            assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
        }
    }

    #[test]
    fn rsi_warmup_is_period_bars() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 % 3.0).collect();
        let result = Rsi::new(14).compute(&make_bars(&closes));
        assert_eq!(result.iter().take_while(|v| v.is_nan()).count(), 14);
        assert_eq!(Rsi::new(14).lookback(), 14);
    }

    #[test]
    fn rsi_nan_propagation() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
