//! Delta-hedged position lifecycle: FLAT → OPEN → CLOSED → FLAT.
//!
//! One position at most, held inside `LifecycleState::Open`, so a second
//! concurrent position is unrepresentable. The manager is the only writer of
//! the balance and only touches it when a trade is realized.
//!
//! Per bar:
//! 1. A `Closed` state from the previous bar returns to `Flat` (no same-bar
//!    re-entry after an exit).
//! 2. Undefined signals skip the bar for entry, exit and adjustment alike.
//! 3. Flat: the four entry conditions are checked in order.
//! 4. Open: mark both legs, walk the exit table in priority order, otherwise
//!    re-hedge if delta drifted past the adjustment threshold.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Bar, ExitReason, PnlMark, Position, Trade};
use crate::greeks::GreeksSnapshot;

use super::config::EngineConfig;

/// Everything the manager reads for one bar besides the bar itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSignals {
    pub greeks: GreeksSnapshot,
    pub vwap: f64,
    pub volume_ma: f64,
}

impl BarSignals {
    pub fn is_defined(&self) -> bool {
        self.greeks.is_defined() && self.vwap.is_finite() && self.volume_ma.is_finite()
    }
}

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Open,
    Closed,
}

#[derive(Debug, Clone)]
enum LifecycleState {
    Flat,
    Open(Position),
    /// Closed on the current bar; becomes `Flat` on the next one.
    Closed,
}

/// Entry conditions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryCondition {
    GammaAboveThreshold,
    NearVwap,
    VegaBelowThreshold,
    VolumeAboveAverage,
    /// Size came out non-finite or non-positive.
    Sizing,
}

/// What happened on one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum BarOutcome {
    /// Signals undefined; nothing evaluated.
    Skipped,
    /// Flat and the named entry condition failed.
    NoEntry { failed: EntryCondition },
    Entered { size: f64, hedge_ratio: f64 },
    Held { mark: PnlMark },
    HedgeAdjusted { from: f64, to: f64, mark: PnlMark },
    Exited(Trade),
}

/// Inputs to the exit predicates.
struct ExitContext {
    total_pnl: f64,
    entry_notional: f64,
    price: f64,
    gamma: f64,
    vega: f64,
    vwap: f64,
}

type ExitRule = (ExitReason, fn(&ExitContext, &EngineConfig) -> bool);

/// Exit predicates in priority order: the first that holds wins.
const EXIT_RULES: [ExitRule; 5] = [
    (ExitReason::TakeProfit, |c, cfg| {
        c.total_pnl > c.entry_notional * cfg.take_profit
    }),
    (ExitReason::StopLoss, |c, cfg| {
        c.total_pnl < c.entry_notional * cfg.stop_loss
    }),
    (ExitReason::GammaDecay, |c, cfg| c.gamma < cfg.gamma_exit_threshold),
    (ExitReason::VegaSpike, |c, cfg| c.vega > cfg.vega_exit_threshold),
    (ExitReason::PriceDrift, |c, cfg| {
        (c.price - c.vwap).abs() > c.price * cfg.vwap_exit_threshold
    }),
];

type EntryRule = (EntryCondition, fn(&Bar, &BarSignals, &EngineConfig) -> bool);

/// Entry predicates; all must hold, checked in this order.
const ENTRY_RULES: [EntryRule; 4] = [
    (EntryCondition::GammaAboveThreshold, |_, s, cfg| {
        s.greeks.gamma > cfg.gamma_entry_threshold
    }),
    (EntryCondition::NearVwap, |b, s, cfg| {
        (b.close - s.vwap).abs() < b.close * cfg.vwap_entry_threshold
    }),
    (EntryCondition::VegaBelowThreshold, |_, s, cfg| {
        s.greeks.vega < cfg.vega_entry_threshold
    }),
    (EntryCondition::VolumeAboveAverage, |b, s, _| b.volume > s.volume_ma),
];

/// The lifecycle state machine.
#[derive(Debug, Clone)]
pub struct PositionLifecycleManager {
    config: EngineConfig,
    state: LifecycleState,
}

impl PositionLifecycleManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Flat,
        }
    }

    pub fn state(&self) -> PositionState {
        match self.state {
            LifecycleState::Flat => PositionState::Flat,
            LifecycleState::Open(_) => PositionState::Open,
            LifecycleState::Closed => PositionState::Closed,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            LifecycleState::Open(position) => Some(position),
            _ => None,
        }
    }

    /// Evaluate one bar. `index` is the bar's position in the replay.
    pub fn on_bar(
        &mut self,
        index: usize,
        bar: &Bar,
        signals: &BarSignals,
        balance: &mut f64,
    ) -> BarOutcome {
        // Closed from the previous bar falls through to Flat here.
        let mut position = match std::mem::replace(&mut self.state, LifecycleState::Flat) {
            LifecycleState::Open(position) => position,
            LifecycleState::Flat | LifecycleState::Closed => {
                if !signals.is_defined() {
                    return BarOutcome::Skipped;
                }
                return self.try_enter(index, bar, signals, *balance);
            }
        };

        if !signals.is_defined() {
            self.state = LifecycleState::Open(position);
            return BarOutcome::Skipped;
        }

        let price = bar.close;
        let greeks = &signals.greeks;
        let mark = position.mark(price, greeks.gamma, self.config.position_multiplier);
        position.record_mark(mark, greeks.gamma);

        let ctx = ExitContext {
            total_pnl: mark.total_pnl,
            entry_notional: position.entry_notional(),
            price,
            gamma: greeks.gamma,
            vega: greeks.vega,
            vwap: signals.vwap,
        };
        let exit = EXIT_RULES
            .iter()
            .find(|(_, fires)| fires(&ctx, &self.config))
            .map(|(reason, _)| *reason);
        if let Some(reason) = exit {
            let trade = self.close(position, index, bar.timestamp, price, mark, reason, balance);
            return BarOutcome::Exited(trade);
        }

        let from = position.hedge_ratio;
        let outcome = if (greeks.delta - from).abs() > self.config.hedge_adjustment_threshold {
            position.hedge_ratio = greeks.delta;
            position.hedge_adjustments += 1;
            debug!(index, from, to = greeks.delta, "hedge adjusted");
            BarOutcome::HedgeAdjusted {
                from,
                to: greeks.delta,
                mark,
            }
        } else {
            BarOutcome::Held { mark }
        };
        self.state = LifecycleState::Open(position);
        outcome
    }

    /// Close an open position at `bar.close`, marked with the last defined
    /// gamma. Returns `None` when nothing is open.
    pub fn force_close(
        &mut self,
        index: usize,
        bar: &Bar,
        reason: ExitReason,
        balance: &mut f64,
    ) -> Option<Trade> {
        match std::mem::replace(&mut self.state, LifecycleState::Flat) {
            LifecycleState::Open(mut position) => {
                let gamma = position.last_gamma;
                let mark = position.mark(bar.close, gamma, self.config.position_multiplier);
                position.record_mark(mark, gamma);
                Some(self.close(position, index, bar.timestamp, bar.close, mark, reason, balance))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn try_enter(&mut self, index: usize, bar: &Bar, signals: &BarSignals, balance: f64) -> BarOutcome {
        if let Some((failed, _)) = ENTRY_RULES
            .iter()
            .find(|(_, holds)| !holds(bar, signals, &self.config))
        {
            return BarOutcome::NoEntry { failed: *failed };
        }

        let price = bar.close;
        let greeks = signals.greeks;
        let size = balance * self.config.risk_per_trade / (price * greeks.gamma);
        if !size.is_finite() || size <= 0.0 {
            return BarOutcome::NoEntry {
                failed: EntryCondition::Sizing,
            };
        }

        self.state = LifecycleState::Open(Position {
            entry_index: index,
            entry_time: bar.timestamp,
            entry_price: price,
            strike: price,
            hedge_ratio: greeks.delta,
            size,
            entry_greeks: greeks,
            hedge_adjustments: 0,
            mae: 0.0,
            mfe: 0.0,
            last_mark: PnlMark {
                option_pnl: 0.0,
                hedge_pnl: 0.0,
                total_pnl: 0.0,
            },
            last_gamma: greeks.gamma,
        });
        debug!(index, price, size, hedge_ratio = greeks.delta, "position opened");
        BarOutcome::Entered {
            size,
            hedge_ratio: greeks.delta,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn close(
        &mut self,
        position: Position,
        index: usize,
        time: NaiveDateTime,
        price: f64,
        mark: PnlMark,
        reason: ExitReason,
        balance: &mut f64,
    ) -> Trade {
        self.state = LifecycleState::Closed;
        *balance += mark.total_pnl;
        info!(
            entry = position.entry_index,
            exit = index,
            reason = %reason,
            pnl = mark.total_pnl,
            balance = *balance,
            "position closed"
        );
        Trade {
            entry_index: position.entry_index,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            strike: position.strike,
            exit_index: index,
            exit_time: time,
            exit_price: price,
            exit_reason: reason,
            size: position.size,
            hedge_ratio: position.hedge_ratio,
            hedge_adjustments: position.hedge_adjustments,
            option_pnl: mark.option_pnl,
            hedge_pnl: mark.hedge_pnl,
            total_pnl: mark.total_pnl,
            mae: position.mae,
            mfe: position.mfe,
            bars_held: index - position.entry_index,
        }
    }
}
