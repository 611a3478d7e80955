//! Replay driver: feeds a bar series through indicators, Greeks and the
//! lifecycle manager, and owns the account balance for the run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{check_series, Bar, DataError, ExitReason, Trade};
use crate::greeks::GreeksSnapshot;
use crate::indicators::IndicatorDeriver;

use super::config::{ConfigError, EngineConfig};
use super::greeks_source::{greeks_for_bar, HeldOption};
use super::lifecycle::{BarOutcome, BarSignals, PositionLifecycleManager};
use super::warmup::WarmupState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("invalid bar data: {0}")]
    Data(#[from] DataError),

    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),
}

/// Why a bar produced no decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Inside the indicator warm-up window.
    WarmUp,
    /// Past warm-up but a Greek, VWAP or volume average was still undefined.
    UndefinedSignal,
    /// Analytic Greeks rejected their inputs.
    InvalidGreeksInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedBar {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Termination {
    /// Every bar was replayed.
    Completed,
    /// Balance fell below the configured floor after the trade closed on `index`.
    BalanceFloor { index: usize },
}

/// Account state at the end of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    /// Realized balance.
    pub balance: f64,
    /// Balance plus the open position's latest mark.
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub trades: Vec<Trade>,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub skipped: Vec<SkippedBar>,
    pub warmup_bars: usize,
    pub bars_processed: usize,
    pub hedge_adjustments: usize,
    pub termination: Termination,
}

impl ReplayReport {
    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.total_pnl).sum()
    }

    pub fn skipped_with(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Runs one bar series against one validated `EngineConfig`.
#[derive(Debug, Clone)]
pub struct ReplayDriver {
    config: EngineConfig,
    deriver: IndicatorDeriver,
}

impl ReplayDriver {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let deriver = IndicatorDeriver::new(config.indicators.clone());
        Ok(Self { config, deriver })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replay `bars` from a flat account.
    ///
    /// Fails before the first bar if the series is invalid or out of order.
    pub fn run(&self, bars: &[Bar]) -> Result<ReplayReport, ReplayError> {
        check_series(bars)?;

        let config = &self.config;
        let sets = self.deriver.derive(bars);
        let mut warmup = WarmupState::for_config(config, &self.deriver);
        let mut manager = PositionLifecycleManager::new(config.clone());

        let initial_balance = config.initial_balance;
        let balance_floor = initial_balance * config.min_balance_fraction;
        let mut balance = initial_balance;

        let mut trades = Vec::new();
        let mut skipped = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());
        let mut hedge_adjustments = 0;
        let mut termination = Termination::Completed;

        debug!(bars = bars.len(), warmup = warmup.warmup_bars(), "replay started");

        for (index, (bar, set)) in bars.iter().zip(&sets).enumerate() {
            let warm = warmup.is_warm();
            warmup.process_bar();

            let held = manager.position().map(|p| HeldOption {
                strike: p.strike,
                bars_held: index - p.entry_index,
            });
            let (greeks, invalid_input) =
                match greeks_for_bar(&config.greeks, &config.indicators, bar, set, held) {
                    Ok(greeks) => (greeks, false),
                    Err(err) => {
                        warn!(index, timestamp = %bar.timestamp, error = %err, "greeks input rejected, bar skipped");
                        (GreeksSnapshot::undefined(), true)
                    }
                };
            let signals = BarSignals {
                greeks,
                vwap: set.vwap,
                volume_ma: set.volume_ma,
            };

            let mut floor_hit = false;
            match manager.on_bar(index, bar, &signals, &mut balance) {
                BarOutcome::Skipped => {
                    let reason = if invalid_input {
                        SkipReason::InvalidGreeksInput
                    } else if warm {
                        SkipReason::UndefinedSignal
                    } else {
                        SkipReason::WarmUp
                    };
                    skipped.push(SkippedBar {
                        index,
                        timestamp: bar.timestamp,
                        reason,
                    });
                }
                BarOutcome::HedgeAdjusted { .. } => hedge_adjustments += 1,
                BarOutcome::Exited(trade) => {
                    trades.push(trade);
                    floor_hit = balance < balance_floor;
                }
                BarOutcome::NoEntry { .. } | BarOutcome::Entered { .. } | BarOutcome::Held { .. } => {}
            }

            // A position opened on the final bar has nothing to realize yet.
            let opened_this_bar = manager.position().is_some_and(|p| p.entry_index == index);
            if !floor_hit && !opened_this_bar && index + 1 == bars.len() && config.close_open_at_end
            {
                if let Some(trade) =
                    manager.force_close(index, bar, ExitReason::EndOfData, &mut balance)
                {
                    trades.push(trade);
                }
            }

            let open_mark = manager.position().map_or(0.0, |p| p.last_mark.total_pnl);
            equity_curve.push(EquityPoint {
                index,
                timestamp: bar.timestamp,
                balance,
                equity: balance + open_mark,
            });

            if floor_hit {
                warn!(
                    index,
                    timestamp = %bar.timestamp,
                    balance,
                    floor = balance_floor,
                    "balance below floor, replay stopped"
                );
                termination = Termination::BalanceFloor { index };
                break;
            }
        }

        info!(
            bars = equity_curve.len(),
            trades = trades.len(),
            skipped = skipped.len(),
            final_balance = balance,
            "replay finished"
        );

        Ok(ReplayReport {
            trades,
            initial_balance,
            final_balance: balance,
            bars_processed: equity_curve.len(),
            equity_curve,
            skipped,
            warmup_bars: warmup.warmup_bars(),
            hedge_adjustments,
            termination,
        })
    }
}
