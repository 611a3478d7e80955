//! IndicatorDeriver — precomputes every series the replay needs and zips them
//! into one `IndicatorSet` per bar.

use serde::{Deserialize, Serialize};

use super::{Bollinger, Indicator, RealizedVolatility, Rsi, Sma, SmaSource, Vwap};
use crate::domain::Bar;

/// Periods and multipliers for the indicator stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub volume_ma_period: usize,
    /// Return window for realized volatility (analytic Greeks source only).
    pub realized_vol_window: usize,
    /// Bars per year, used to annualize realized volatility and to age options.
    pub bars_per_year: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_k: 2.0,
            volume_ma_period: 20,
            realized_vol_window: 20,
            bars_per_year: 252.0,
        }
    }
}

/// Indicator values for one bar. Fields are `NaN` until warmed up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub vwap: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub volume_ma: f64,
    pub realized_vol: f64,
}

impl IndicatorSet {
    pub fn not_ready() -> Self {
        Self {
            rsi: f64::NAN,
            vwap: f64::NAN,
            bb_upper: f64::NAN,
            bb_middle: f64::NAN,
            bb_lower: f64::NAN,
            volume_ma: f64::NAN,
            realized_vol: f64::NAN,
        }
    }

    /// True when RSI, VWAP, all three bands and the volume average are finite.
    ///
    /// Realized volatility is excluded: only the analytic Greeks source reads it.
    pub fn is_ready(&self) -> bool {
        [
            self.rsi,
            self.vwap,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.volume_ma,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorDeriver {
    params: IndicatorParams,
}

impl IndicatorDeriver {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Leading bars that cannot produce a ready `IndicatorSet`: the slowest
    /// lookback among RSI, Bollinger and volume average.
    pub fn warmup_bars(&self) -> usize {
        let p = &self.params;
        [
            Rsi::new(p.rsi_period).lookback(),
            Bollinger::new(p.bollinger_period, p.bollinger_k).lookback(),
            Sma::new(p.volume_ma_period, SmaSource::Volume).lookback(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Leading bars with no realized volatility.
    pub fn realized_vol_lookback(&self) -> usize {
        let p = &self.params;
        RealizedVolatility::new(p.realized_vol_window, p.bars_per_year).lookback()
    }

    /// One `IndicatorSet` per bar, same length as `bars`.
    pub fn derive(&self, bars: &[Bar]) -> Vec<IndicatorSet> {
        let p = &self.params;
        let rsi = Rsi::new(p.rsi_period).compute(bars);
        let vwap = Vwap::new().compute(bars);
        let bands = Bollinger::new(p.bollinger_period, p.bollinger_k).bands(bars);
        let volume_ma = Sma::new(p.volume_ma_period, SmaSource::Volume).compute(bars);
        let realized_vol =
            RealizedVolatility::new(p.realized_vol_window, p.bars_per_year).compute(bars);

        (0..bars.len())
            .map(|i| IndicatorSet {
                rsi: rsi[i],
                vwap: vwap[i],
                bb_upper: bands.upper[i],
                bb_middle: bands.middle[i],
                bb_lower: bands.lower[i],
                volume_ma: volume_ma[i],
                realized_vol: realized_vol[i],
            })
            .collect()
    }
}

impl Default for IndicatorDeriver {
    fn default() -> Self {
        Self::new(IndicatorParams::default())
    }
}
