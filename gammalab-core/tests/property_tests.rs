//! Property tests for Greeks and replay invariants.
//!
//! Uses proptest to verify:
//! 1. Put-call delta parity — call delta − put delta == 1
//! 2. Gamma is non-negative and identical for calls and puts
//! 3. Trade legs — total_pnl == option_pnl + hedge_pnl on every trade
//! 4. Balance identity — final balance == initial + Σ trade P&L
//! 5. Single position — trades never overlap in time

use chrono::NaiveDate;
use gammalab_core::domain::Bar;
use gammalab_core::engine::{EngineConfig, ReplayDriver, Termination};
use gammalab_core::greeks::{OptionParams, OptionType};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_spot() -> impl Strategy<Value = f64> {
    10.0..500.0_f64
}

fn arb_moneyness() -> impl Strategy<Value = f64> {
    0.5..1.5_f64
}

fn arb_expiry() -> impl Strategy<Value = f64> {
    0.0..2.0_f64
}

fn arb_rate() -> impl Strategy<Value = f64> {
    -0.02..0.10_f64
}

fn arb_vol() -> impl Strategy<Value = f64> {
    0.05..1.0_f64
}

/// A mean-reverting walk around 100 with noisy volume, long enough to warm up.
fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-0.006..0.006_f64, 500.0..3000.0_f64), 30..150).prop_map(|steps| {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        let mut close = 100.0_f64;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (ret, volume))| {
                let open = close;
                close = (close * (1.0 + ret) + (100.0 - close) * 0.1).max(1.0);
                Bar {
                    timestamp: base + chrono::Duration::days(i as i64),
                    open,
                    high: open.max(close) * 1.002,
                    low: open.min(close) * 0.998,
                    close,
                    volume,
                }
            })
            .collect()
    })
}

fn params(spot: f64, moneyness: f64, t: f64, r: f64, sigma: f64, kind: OptionType) -> OptionParams {
    OptionParams::new(spot, spot * moneyness, t, r, sigma, kind)
}

// ── 1–2. Greeks ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn call_minus_put_delta_is_one(
        spot in arb_spot(),
        m in arb_moneyness(),
        t in arb_expiry(),
        r in arb_rate(),
        sigma in arb_vol(),
    ) {
        let call = params(spot, m, t, r, sigma, OptionType::Call).greeks().unwrap();
        let put = params(spot, m, t, r, sigma, OptionType::Put).greeks().unwrap();
        prop_assert!((call.delta - put.delta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gamma_non_negative_and_type_independent(
        spot in arb_spot(),
        m in arb_moneyness(),
        t in arb_expiry(),
        r in arb_rate(),
        sigma in arb_vol(),
    ) {
        let call = params(spot, m, t, r, sigma, OptionType::Call).greeks().unwrap();
        let put = params(spot, m, t, r, sigma, OptionType::Put).greeks().unwrap();
        prop_assert!(call.gamma >= 0.0);
        prop_assert_eq!(call.gamma, put.gamma);
        prop_assert_eq!(call.vega, put.vega);
    }
}

// ── 3–5. Replay ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trade_legs_sum_to_total(bars in arb_bars()) {
        let report = ReplayDriver::new(EngineConfig::default()).unwrap().run(&bars).unwrap();
        for trade in &report.trades {
            prop_assert_eq!(trade.total_pnl, trade.option_pnl + trade.hedge_pnl);
        }
    }

    #[test]
    fn final_balance_is_initial_plus_realized(bars in arb_bars()) {
        let report = ReplayDriver::new(EngineConfig::default()).unwrap().run(&bars).unwrap();
        let expected = report.initial_balance + report.total_pnl();
        prop_assert!((report.final_balance - expected).abs() < 1e-6);
        if let Some(last) = report.equity_curve.last() {
            prop_assert_eq!(last.balance, report.final_balance);
        }
    }

    #[test]
    fn trades_never_overlap(bars in arb_bars()) {
        let report = ReplayDriver::new(EngineConfig::default()).unwrap().run(&bars).unwrap();
        for pair in report.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }
        for trade in &report.trades {
            prop_assert!(trade.exit_index >= trade.entry_index);
        }
        if report.termination == Termination::Completed {
            prop_assert_eq!(report.bars_processed, bars.len());
        }
    }
}
