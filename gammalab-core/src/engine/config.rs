//! Engine parameter set.
//!
//! A plain value passed into the replay driver's constructor. Loading it from
//! a file is the runner's job; this module only defines defaults and checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::greeks::OptionType;
use crate::indicators::IndicatorParams;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("{field} must be at least {min}, got {value}")]
    PeriodTooShort {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

/// Where per-bar Greeks come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GreeksSource {
    /// Heuristic proxies from RSI / VWAP / Bollinger width.
    Synthetic {
        /// Distance from VWAP (fraction of VWAP) at which synthetic gamma is e^-½.
        gamma_bandwidth: f64,
    },
    /// Black-Scholes on an option struck at the money at entry.
    BlackScholes {
        option_type: OptionType,
        risk_free_rate: f64,
        /// Calendar days to expiry when the position opens.
        days_to_expiry: f64,
        volatility: VolatilitySource,
    },
}

impl GreeksSource {
    /// True when Greeks read the realized-volatility series.
    pub fn uses_realized_vol(&self) -> bool {
        matches!(
            self,
            GreeksSource::BlackScholes {
                volatility: VolatilitySource::Realized,
                ..
            }
        )
    }
}

impl Default for GreeksSource {
    fn default() -> Self {
        GreeksSource::Synthetic {
            gamma_bandwidth: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolatilitySource {
    Fixed { sigma: f64 },
    /// Annualized realized volatility over `IndicatorParams::realized_vol_window`.
    Realized,
}

/// Thresholds and sizing for the delta-hedged lifecycle.
///
/// Defaults are tuned for the synthetic Greeks source, where gamma lives in
/// (0, 1] and vega is a band-width fraction. They are tunable parameters, not
/// financially meaningful constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_balance: f64,
    /// Fraction of balance put at risk on each entry.
    pub risk_per_trade: f64,

    // ── Entry ──
    pub gamma_entry_threshold: f64,
    /// Max |price − VWAP| as a fraction of price.
    pub vwap_entry_threshold: f64,
    pub vega_entry_threshold: f64,

    // ── Exit ──
    /// Fraction of entry notional.
    pub take_profit: f64,
    /// Fraction of entry notional, negative.
    pub stop_loss: f64,
    pub gamma_exit_threshold: f64,
    pub vega_exit_threshold: f64,
    pub vwap_exit_threshold: f64,

    // ── Hedging ──
    pub hedge_adjustment_threshold: f64,
    pub position_multiplier: f64,

    // ── Replay control ──
    /// Stop the replay once balance falls below this fraction of the initial balance.
    pub min_balance_fraction: f64,
    /// Close any open position on the final bar.
    pub close_open_at_end: bool,

    pub indicators: IndicatorParams,
    pub greeks: GreeksSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100_000.0,
            risk_per_trade: 0.02,
            gamma_entry_threshold: 0.7,
            vwap_entry_threshold: 0.005,
            vega_entry_threshold: 0.06,
            take_profit: 0.02,
            stop_loss: -0.01,
            gamma_exit_threshold: 0.3,
            vega_exit_threshold: 0.12,
            vwap_exit_threshold: 0.02,
            hedge_adjustment_threshold: 0.1,
            position_multiplier: 1.0,
            min_balance_fraction: 0.5,
            close_open_at_end: true,
            indicators: IndicatorParams::default(),
            greeks: GreeksSource::default(),
        }
    }
}

fn require(
    ok: bool,
    field: &'static str,
    requirement: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}

fn require_period(field: &'static str, min: usize, value: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::PeriodTooShort { field, min, value })
    }
}

impl EngineConfig {
    /// Reject parameter sets the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self;
        require(c.initial_balance > 0.0, "initial_balance", "positive", c.initial_balance)?;
        require(
            c.risk_per_trade > 0.0 && c.risk_per_trade <= 1.0,
            "risk_per_trade",
            "in (0, 1]",
            c.risk_per_trade,
        )?;
        require(
            c.gamma_entry_threshold > 0.0,
            "gamma_entry_threshold",
            "positive",
            c.gamma_entry_threshold,
        )?;
        require(
            c.vwap_entry_threshold > 0.0,
            "vwap_entry_threshold",
            "positive",
            c.vwap_entry_threshold,
        )?;
        require(
            c.vega_entry_threshold > 0.0,
            "vega_entry_threshold",
            "positive",
            c.vega_entry_threshold,
        )?;
        require(c.take_profit > 0.0, "take_profit", "positive", c.take_profit)?;
        require(c.stop_loss < 0.0, "stop_loss", "negative", c.stop_loss)?;
        require(
            c.gamma_exit_threshold >= 0.0,
            "gamma_exit_threshold",
            "non-negative",
            c.gamma_exit_threshold,
        )?;
        require(
            c.vega_exit_threshold > 0.0,
            "vega_exit_threshold",
            "positive",
            c.vega_exit_threshold,
        )?;
        require(
            c.vwap_exit_threshold > 0.0,
            "vwap_exit_threshold",
            "positive",
            c.vwap_exit_threshold,
        )?;
        require(
            c.hedge_adjustment_threshold >= 0.0,
            "hedge_adjustment_threshold",
            "non-negative",
            c.hedge_adjustment_threshold,
        )?;
        require(
            c.position_multiplier > 0.0,
            "position_multiplier",
            "positive",
            c.position_multiplier,
        )?;
        require(
            (0.0..1.0).contains(&c.min_balance_fraction),
            "min_balance_fraction",
            "in [0, 1)",
            c.min_balance_fraction,
        )?;

        let p = &c.indicators;
        require_period("indicators.rsi_period", 1, p.rsi_period)?;
        require_period("indicators.bollinger_period", 1, p.bollinger_period)?;
        require_period("indicators.volume_ma_period", 1, p.volume_ma_period)?;
        require_period("indicators.realized_vol_window", 2, p.realized_vol_window)?;
        require(
            p.bollinger_k > 0.0,
            "indicators.bollinger_k",
            "positive",
            p.bollinger_k,
        )?;
        require(
            p.bars_per_year > 0.0,
            "indicators.bars_per_year",
            "positive",
            p.bars_per_year,
        )?;

        match &c.greeks {
            GreeksSource::Synthetic { gamma_bandwidth } => require(
                *gamma_bandwidth > 0.0,
                "greeks.gamma_bandwidth",
                "positive",
                *gamma_bandwidth,
            )?,
            GreeksSource::BlackScholes {
                risk_free_rate,
                days_to_expiry,
                volatility,
                ..
            } => {
                require(true, "greeks.risk_free_rate", "finite", *risk_free_rate)?;
                require(
                    *days_to_expiry > 0.0,
                    "greeks.days_to_expiry",
                    "positive",
                    *days_to_expiry,
                )?;
                if let VolatilitySource::Fixed { sigma } = volatility {
                    require(*sigma > 0.0, "greeks.volatility.sigma", "positive", *sigma)?;
                }
            }
        }
        Ok(())
    }
}
