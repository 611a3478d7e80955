//! Equity curve export (CSV).

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gammalab_core::engine::EquityPoint;

pub fn write_equity_csv(path: &Path, equity: &[EquityPoint]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "index,timestamp,balance,equity")?;
    for point in equity {
        writeln!(
            out,
            "{},{},{:.4},{:.4}",
            point.index, point.timestamp, point.balance, point.equity
        )?;
    }
    out.flush()
        .with_context(|| format!("Failed to flush equity CSV {}", path.display()))?;
    Ok(())
}
