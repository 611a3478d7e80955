//! Trade tape export (CSV/JSON).

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use gammalab_core::domain::Trade;

/// One flat CSV row per trade.
#[derive(Serialize)]
struct TradeRow<'a> {
    entry_time: String,
    exit_time: String,
    exit_reason: &'a str,
    entry_price: f64,
    exit_price: f64,
    strike: f64,
    size: f64,
    hedge_ratio: f64,
    hedge_adjustments: usize,
    option_pnl: f64,
    hedge_pnl: f64,
    total_pnl: f64,
    return_pct: f64,
    mae: f64,
    mfe: f64,
    bars_held: usize,
}

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;

    for trade in trades {
        writer
            .serialize(TradeRow {
                entry_time: trade.entry_time.to_string(),
                exit_time: trade.exit_time.to_string(),
                exit_reason: trade.exit_reason.as_str(),
                entry_price: trade.entry_price,
                exit_price: trade.exit_price,
                strike: trade.strike,
                size: trade.size,
                hedge_ratio: trade.hedge_ratio,
                hedge_adjustments: trade.hedge_adjustments,
                option_pnl: trade.option_pnl,
                hedge_pnl: trade.hedge_pnl,
                total_pnl: trade.total_pnl,
                return_pct: trade.return_pct(),
                mae: trade.mae,
                mfe: trade.mfe,
                bars_held: trade.bars_held,
            })
            .context("Failed to write trade row")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush trades CSV {}", path.display()))?;
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("Failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write trades JSON {}", path.display()))?;
    Ok(())
}
