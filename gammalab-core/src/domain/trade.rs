//! Trade — a completed round trip of the option leg and its hedge.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a position was closed.
///
/// The first five variants are listed in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    GammaDecay,
    VegaSpike,
    PriceDrift,
    /// Forced close on the final bar of the dataset.
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::GammaDecay => "gamma_decay",
            ExitReason::VegaSpike => "vega_spike",
            ExitReason::PriceDrift => "price_drift",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a closed position.
///
/// `option_pnl` and `hedge_pnl` are already scaled by `size`, so
/// `total_pnl == option_pnl + hedge_pnl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub strike: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size & hedge ──
    pub size: f64,
    pub hedge_ratio: f64,
    pub hedge_adjustments: usize,

    // ── PnL ──
    pub option_pnl: f64,
    pub hedge_pnl: f64,
    pub total_pnl: f64,

    // ── Excursion ──
    /// Worst marked total P&L while open (≤ 0 unless every mark was positive).
    pub mae: f64,
    /// Best marked total P&L while open.
    pub mfe: f64,

    pub bars_held: usize,
}

impl Trade {
    pub fn entry_notional(&self) -> f64 {
        self.entry_price * self.size
    }

    /// Return on the trade as a fraction of entry notional.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_notional();
        if notional == 0.0 {
            return 0.0;
        }
        self.total_pnl / notional
    }

    pub fn is_winner(&self) -> bool {
        self.total_pnl > 0.0
    }
}
