use crate::greeks::GreeksSnapshot;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Marked P&L of an open position, legs already scaled by size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlMark {
    pub option_pnl: f64,
    pub hedge_pnl: f64,
    pub total_pnl: f64,
}

/// The single open synthetic-option + hedge position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub strike: f64,
    /// Current delta-hedge target.
    pub hedge_ratio: f64,
    pub size: f64,
    pub entry_greeks: GreeksSnapshot,
    pub hedge_adjustments: usize,
    pub mae: f64,
    pub mfe: f64,
    /// Most recent mark, used when the position must be closed on a bar
    /// whose Greeks are undefined.
    pub last_mark: PnlMark,
    pub last_gamma: f64,
}

impl Position {
    pub fn entry_notional(&self) -> f64 {
        self.entry_price * self.size
    }

    /// Mark both legs at `price` using the current bar's gamma.
    pub fn mark(&self, price: f64, gamma: f64, position_multiplier: f64) -> PnlMark {
        let move_from_entry = price - self.entry_price;
        let option_leg = move_from_entry * gamma * position_multiplier;
        let hedge_leg = -self.hedge_ratio * move_from_entry;
        let option_pnl = option_leg * self.size;
        let hedge_pnl = hedge_leg * self.size;
        PnlMark {
            option_pnl,
            hedge_pnl,
            total_pnl: option_pnl + hedge_pnl,
        }
    }

    /// Record a mark for excursion tracking.
    pub fn record_mark(&mut self, mark: PnlMark, gamma: f64) {
        self.mae = self.mae.min(mark.total_pnl);
        self.mfe = self.mfe.max(mark.total_pnl);
        self.last_mark = mark;
        self.last_gamma = gamma;
    }
}
