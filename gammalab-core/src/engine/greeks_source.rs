//! Per-bar Greeks from the configured source.
//!
//! Synthetic: proxies from the bar's `IndicatorSet`.
//! Black-Scholes: an option struck at the entry price while a position is
//! open (at the current close while flat), aged by the bars it has been held.

use crate::domain::Bar;
use crate::greeks::{GreeksSnapshot, InvalidInputError, OptionParams};
use crate::indicators::{synthetic_greeks, IndicatorParams, IndicatorSet};

use super::config::{GreeksSource, VolatilitySource};

/// Open-position context the analytic source needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldOption {
    pub strike: f64,
    pub bars_held: usize,
}

/// Greeks for one bar.
///
/// Undefined inputs (warm-up) yield an undefined snapshot, not an error.
/// An error means the inputs were defined but invalid (e.g. zero realized
/// volatility on a flat series); the caller skips the bar.
pub fn greeks_for_bar(
    source: &GreeksSource,
    indicators: &IndicatorParams,
    bar: &Bar,
    set: &IndicatorSet,
    held: Option<HeldOption>,
) -> Result<GreeksSnapshot, InvalidInputError> {
    match source {
        GreeksSource::Synthetic { gamma_bandwidth } => {
            Ok(synthetic_greeks(bar.close, set, *gamma_bandwidth))
        }
        GreeksSource::BlackScholes {
            option_type,
            risk_free_rate,
            days_to_expiry,
            volatility,
        } => {
            let sigma = match volatility {
                VolatilitySource::Fixed { sigma } => *sigma,
                VolatilitySource::Realized => set.realized_vol,
            };
            if sigma.is_nan() {
                return Ok(GreeksSnapshot::undefined());
            }
            let (strike, bars_held) = match held {
                Some(h) => (h.strike, h.bars_held),
                None => (bar.close, 0),
            };
            let time_to_expiry =
                days_to_expiry / 365.0 - bars_held as f64 / indicators.bars_per_year;
            OptionParams::new(
                bar.close,
                strike,
                time_to_expiry,
                *risk_free_rate,
                sigma,
                *option_type,
            )
            .greeks()
        }
    }
}
