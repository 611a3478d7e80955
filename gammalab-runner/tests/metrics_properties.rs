//! Property tests for the performance summary.
//!
//! Uses proptest over random trade P&L sequences to verify:
//! 1. Drawdown is non-negative and bounded by total losses
//! 2. Balance identity: final balance == initial + Σ trade P&L
//! 3. Win rate lies in [0, 1] and win/loss counts partition the trades
//! 4. Purity: a prefix and a copy of that prefix summarize identically

use chrono::NaiveDate;
use gammalab_core::domain::{ExitReason, Trade};
use gammalab_runner::metrics::{max_drawdown, PerformanceSummary};
use proptest::prelude::*;

const INITIAL_BALANCE: f64 = 100_000.0;

fn trade(index: usize, total_pnl: f64) -> Trade {
    let entry_time = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap()
        + chrono::Duration::days(index as i64 * 3);
    let hedge_pnl = -total_pnl * 0.25;
    Trade {
        entry_index: index * 3,
        entry_time,
        entry_price: 100.0,
        strike: 100.0,
        exit_index: index * 3 + 2,
        exit_time: entry_time + chrono::Duration::days(2),
        exit_price: 101.0,
        exit_reason: if total_pnl > 0.0 {
            ExitReason::TakeProfit
        } else {
            ExitReason::StopLoss
        },
        size: 10.0,
        hedge_ratio: 0.5,
        hedge_adjustments: 0,
        option_pnl: total_pnl - hedge_pnl,
        hedge_pnl,
        total_pnl,
        mae: total_pnl.min(0.0),
        mfe: total_pnl.max(0.0),
        bars_held: 2,
    }
}

fn arb_trades() -> impl Strategy<Value = Vec<Trade>> {
    prop::collection::vec(-2_000.0..2_000.0_f64, 0..60).prop_map(|pnls| {
        pnls.into_iter()
            .enumerate()
            .map(|(i, pnl)| trade(i, pnl))
            .collect()
    })
}

proptest! {
    #[test]
    fn drawdown_non_negative_and_bounded(trades in arb_trades()) {
        let s = PerformanceSummary::compute(&trades, INITIAL_BALANCE, 252.0_f64.sqrt());
        let gross_loss: f64 = trades.iter().map(|t| t.total_pnl.min(0.0).abs()).sum();
        prop_assert!(s.max_drawdown >= 0.0);
        prop_assert!(s.max_drawdown_pct >= 0.0);
        prop_assert!(s.max_drawdown <= gross_loss + 1e-6);
    }

    #[test]
    fn final_balance_is_initial_plus_pnl(trades in arb_trades()) {
        let s = PerformanceSummary::compute(&trades, INITIAL_BALANCE, 1.0);
        let sum: f64 = trades.iter().map(|t| t.total_pnl).sum();
        prop_assert!((s.final_balance - (INITIAL_BALANCE + sum)).abs() < 1e-6);
        prop_assert!((s.total_pnl - sum).abs() < 1e-6);
    }

    #[test]
    fn win_rate_is_a_fraction(trades in arb_trades()) {
        let s = PerformanceSummary::compute(&trades, INITIAL_BALANCE, 1.0);
        prop_assert!((0.0..=1.0).contains(&s.win_rate));
        prop_assert_eq!(s.winning_trades + s.losing_trades, s.total_trades);
        prop_assert_eq!(s.exit_reasons.values().sum::<usize>(), s.total_trades);
    }

    #[test]
    fn prefix_summary_is_pure(trades in arb_trades(), cut in 0usize..60) {
        let cut = cut.min(trades.len());
        let prefix = &trades[..cut];
        let copy: Vec<Trade> = prefix.to_vec();

        let a = PerformanceSummary::compute(prefix, INITIAL_BALANCE, 252.0_f64.sqrt());
        let b = PerformanceSummary::compute(&copy, INITIAL_BALANCE, 252.0_f64.sqrt());
        prop_assert_eq!(&a, &b);

        // Computing on the prefix leaves the full sequence untouched.
        let again = PerformanceSummary::compute(&trades, INITIAL_BALANCE, 1.0);
        prop_assert_eq!(again.total_trades, trades.len());
        prop_assert_eq!(max_drawdown(prefix, INITIAL_BALANCE), (a.max_drawdown, a.max_drawdown_pct));
    }
}
