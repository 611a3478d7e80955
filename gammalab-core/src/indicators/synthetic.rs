//! Synthetic Greeks proxies for datasets with no option chain.
//!
//! These are heuristics built from RSI, VWAP and Bollinger width. They share
//! names with option Greeks because the lifecycle manager consumes them in the
//! same slots, but they have no verified correspondence to market Greeks:
//!
//! - delta: RSI distance from 50, scaled to [-1, 1] (directional bias)
//! - gamma: Gaussian falloff of (close - VWAP), 1.0 at VWAP
//! - vega: Bollinger band width / close
//! - theta: 0 (no time-decay proxy)
//!
//! Any NaN input yields a NaN output so warm-up bars stay undefined.

use crate::greeks::GreeksSnapshot;

use super::IndicatorSet;

/// RSI → [-1, 1].
pub fn synthetic_delta(rsi: f64) -> f64 {
    if rsi.is_nan() {
        return f64::NAN;
    }
    ((rsi - 50.0) / 50.0).clamp(-1.0, 1.0)
}

/// exp(-½ · ((close - vwap) / (bandwidth · vwap))²).
///
/// `bandwidth` is the distance from VWAP, as a fraction of VWAP, at which the
/// proxy has fallen to e^-½.
pub fn synthetic_gamma(close: f64, vwap: f64, bandwidth: f64) -> f64 {
    let scale = bandwidth * vwap;
    if close.is_nan() || vwap.is_nan() || scale.is_nan() || scale <= 0.0 {
        return f64::NAN;
    }
    let z = (close - vwap) / scale;
    (-0.5 * z * z).exp()
}

/// (upper - lower) / close.
pub fn synthetic_vega(upper: f64, lower: f64, close: f64) -> f64 {
    if close <= 0.0 {
        return f64::NAN;
    }
    (upper - lower) / close
}

/// Build a snapshot for one bar.
pub fn synthetic_greeks(close: f64, set: &IndicatorSet, gamma_bandwidth: f64) -> GreeksSnapshot {
    GreeksSnapshot {
        delta: synthetic_delta(set.rsi),
        gamma: synthetic_gamma(close, set.vwap, gamma_bandwidth),
        theta: 0.0,
        vega: synthetic_vega(set.bb_upper, set.bb_lower, close),
    }
}
