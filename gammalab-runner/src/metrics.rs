//! Performance summary — pure functions over the closed-trade list.
//!
//! Every metric is a pure function: trades (and the starting balance) in,
//! scalar out. Safe on any prefix of a trade list, including the empty one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gammalab_core::domain::{ExitReason, Trade};

/// Aggregate statistics for one replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub avg_win: f64,
    /// Mean of losing trades' P&L (≤ 0).
    pub avg_loss: f64,
    /// Largest peak-to-trough fall of the running balance, in currency (≥ 0).
    pub max_drawdown: f64,
    /// Same drawdown as a fraction of the peak it fell from.
    pub max_drawdown_pct: f64,
    pub sharpe: f64,
    pub profit_factor: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub final_balance: f64,
    pub return_pct: f64,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
}

impl PerformanceSummary {
    /// Compute every metric from trades in close order.
    pub fn compute(trades: &[Trade], initial_balance: f64, annualization_factor: f64) -> Self {
        let total_pnl = total_pnl(trades);
        let final_balance = initial_balance + total_pnl;
        let (max_drawdown, max_drawdown_pct) = max_drawdown(trades, initial_balance);
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        Self {
            total_trades: trades.len(),
            winning_trades,
            losing_trades: trades.len() - winning_trades,
            total_pnl,
            win_rate: win_rate(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            max_drawdown,
            max_drawdown_pct,
            sharpe: sharpe_ratio(trades, annualization_factor),
            profit_factor: profit_factor(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
            final_balance,
            return_pct: if initial_balance > 0.0 {
                total_pnl / initial_balance
            } else {
                0.0
            },
            exit_reasons: exit_reason_counts(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.total_pnl).sum()
}

/// Fraction of trades with positive P&L. 0 when empty.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.total_pnl)
        .collect();
    mean_f64(&wins)
}

pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.total_pnl)
        .collect();
    mean_f64(&losses)
}

/// Maximum drawdown of the balance after each trade, starting from
/// `initial_balance`. Returns (currency, fraction of peak), both ≥ 0.
pub fn max_drawdown(trades: &[Trade], initial_balance: f64) -> (f64, f64) {
    let mut balance = initial_balance;
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;

    for trade in trades {
        balance += trade.total_pnl;
        if balance > peak {
            peak = balance;
        }
        let dd = peak - balance;
        if dd > max_dd {
            max_dd = dd;
        }
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak);
        }
    }
    (max_dd, max_dd_pct)
}

/// Per-trade Sharpe: mean(P&L) × factor / sample stdev(P&L).
///
/// Returns 0.0 with fewer than 2 trades or zero variance.
pub fn sharpe_ratio(trades: &[Trade], annualization_factor: f64) -> f64 {
    let pnl: Vec<f64> = trades.iter().map(|t| t.total_pnl).collect();
    if pnl.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&pnl);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&pnl) * annualization_factor / std
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.total_pnl > 0.0)
        .map(|t| t.total_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.total_pnl < 0.0)
        .map(|t| t.total_pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    max_consecutive(trades, true)
}

pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    max_consecutive(trades, false)
}

pub fn exit_reason_counts(trades: &[Trade]) -> BTreeMap<ExitReason, usize> {
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(trade.exit_reason).or_insert(0) += 1;
    }
    counts
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_trade(total_pnl: f64, exit_reason: ExitReason) -> Trade {
        let time = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        Trade {
            entry_index: 0,
            entry_time: time,
            entry_price: 100.0,
            strike: 100.0,
            exit_index: 5,
            exit_time: time,
            exit_price: 101.0,
            exit_reason,
            size: 10.0,
            hedge_ratio: 0.1,
            hedge_adjustments: 0,
            option_pnl: total_pnl * 2.0,
            hedge_pnl: -total_pnl,
            total_pnl,
            mae: total_pnl.min(0.0),
            mfe: total_pnl.max(0.0),
            bars_held: 5,
        }
    }

    fn trades(pnls: &[f64]) -> Vec<Trade> {
        pnls.iter()
            .map(|&p| {
                let reason = if p > 0.0 {
                    ExitReason::TakeProfit
                } else {
                    ExitReason::StopLoss
                };
                make_trade(p, reason)
            })
            .collect()
    }

    #[test]
    fn empty_trades_all_zero() {
        let s = PerformanceSummary::compute(&[], 10_000.0, 1.0);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.total_pnl, 0.0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.avg_win, 0.0);
        assert_eq!(s.avg_loss, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.sharpe, 0.0);
        assert_eq!(s.profit_factor, 0.0);
        assert_eq!(s.final_balance, 10_000.0);
        assert!(s.exit_reasons.is_empty());
    }

    #[test]
    fn basic_aggregates() {
        let t = trades(&[100.0, -50.0, 200.0, -25.0]);
        let s = PerformanceSummary::compute(&t, 10_000.0, 1.0);
        assert_eq!(s.total_trades, 4);
        assert_eq!(s.winning_trades, 2);
        assert_eq!(s.losing_trades, 2);
        assert!((s.total_pnl - 225.0).abs() < 1e-10);
        assert!((s.win_rate - 0.5).abs() < 1e-10);
        assert!((s.avg_win - 150.0).abs() < 1e-10);
        assert!((s.avg_loss - -37.5).abs() < 1e-10);
        assert!((s.profit_factor - 4.0).abs() < 1e-10);
        assert!((s.final_balance - 10_225.0).abs() < 1e-10);
        assert!((s.return_pct - 0.0225).abs() < 1e-12);
        assert_eq!(s.exit_reasons[&ExitReason::TakeProfit], 2);
        assert_eq!(s.exit_reasons[&ExitReason::StopLoss], 2);
    }

    #[test]
    fn drawdown_from_running_peak() {
        // balance: 10000 → 10100 → 10000 → 9900 → 10200
        let t = trades(&[100.0, -100.0, -100.0, 300.0]);
        let (dd, pct) = max_drawdown(&t, 10_000.0);
        assert!((dd - 200.0).abs() < 1e-10);
        assert!((pct - 200.0 / 10_100.0).abs() < 1e-12);
    }

    #[test]
    fn drawdown_below_initial_counts() {
        let t = trades(&[-300.0]);
        let (dd, pct) = max_drawdown(&t, 1_000.0);
        assert!((dd - 300.0).abs() < 1e-10);
        assert!((pct - 0.3).abs() < 1e-12);
    }

    #[test]
    fn sharpe_uses_sample_stdev() {
        let t = trades(&[1.0, 3.0]);
        // mean 2, sample stdev sqrt(2)
        let s = sharpe_ratio(&t, 10.0);
        assert!((s - 2.0 * 10.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sharpe_degenerate_cases_zero() {
        assert_eq!(sharpe_ratio(&trades(&[5.0]), 1.0), 0.0);
        assert_eq!(sharpe_ratio(&trades(&[5.0, 5.0, 5.0]), 1.0), 0.0);
    }

    #[test]
    fn profit_factor_capped() {
        assert_eq!(profit_factor(&trades(&[10.0, 20.0])), 100.0);
        assert_eq!(profit_factor(&trades(&[-10.0])), 0.0);
    }

    #[test]
    fn consecutive_streaks() {
        let t = trades(&[1.0, 1.0, -1.0, -1.0, -1.0, 1.0]);
        assert_eq!(max_consecutive_wins(&t), 2);
        assert_eq!(max_consecutive_losses(&t), 3);
    }

    #[test]
    fn zero_pnl_trade_is_a_loss() {
        let t = trades(&[0.0]);
        let s = PerformanceSummary::compute(&t, 1_000.0, 1.0);
        assert_eq!(s.winning_trades, 0);
        assert_eq!(s.losing_trades, 1);
    }

    #[test]
    fn prefix_is_idempotent() {
        let t = trades(&[100.0, -50.0, 200.0]);
        let a = PerformanceSummary::compute(&t[..2], 1_000.0, 1.0);
        let b = PerformanceSummary::compute(&t[..2], 1_000.0, 1.0);
        assert_eq!(a, b);
    }
}
