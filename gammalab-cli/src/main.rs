//! GammaLab CLI — replay runs, one-off Greeks and config scaffolding.
//!
//! Commands:
//! - `run` — replay one or more CSV or synthetic datasets and export artifacts
//! - `greeks` — evaluate Black-Scholes price and Greeks for one option
//! - `init-config` — print the default run configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use gammalab_core::greeks::{OptionParams, OptionType};
use gammalab_runner::{
    run_specs, ArtifactManager, DataSource, DatasetResult, DatasetSpec, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "gammalab",
    about = "GammaLab CLI — delta-hedged gamma scalping replay engine"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay datasets through the hedging engine.
    Run {
        /// CSV files with timestamp,open,high,low,close,volume columns.
        csv: Vec<PathBuf>,

        /// Generate a deterministic synthetic series with this name (repeatable).
        #[arg(long)]
        synthetic: Vec<String>,

        /// Path to a TOML run config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print summaries only, write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Price one European option and print its Greeks as JSON.
    Greeks {
        #[arg(long)]
        spot: f64,

        /// Defaults to the spot (at the money).
        #[arg(long)]
        strike: Option<f64>,

        /// Calendar days to expiry.
        #[arg(long, default_value_t = 30.0)]
        days: f64,

        #[arg(long, default_value_t = 0.05)]
        rate: f64,

        /// Annualized volatility, e.g. 0.2 for 20%.
        #[arg(long, default_value_t = 0.2)]
        vol: f64,

        #[arg(long, value_enum, default_value_t = Kind::Call)]
        kind: Kind,
    },
    /// Print the default run configuration as TOML.
    InitConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Call,
    Put,
}

impl From<Kind> for OptionType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Call => OptionType::Call,
            Kind::Put => OptionType::Put,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            csv,
            synthetic,
            config,
            output_dir,
            no_save,
        } => run_cmd(csv, synthetic, config, output_dir, no_save),
        Commands::Greeks {
            spot,
            strike,
            days,
            rate,
            vol,
            kind,
        } => greeks_cmd(spot, strike.unwrap_or(spot), days, rate, vol, kind),
        Commands::InitConfig => {
            print!("{}", RunConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,gammalab_core=debug,gammalab_runner=debug"
    } else {
        "warn,gammalab_runner=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_cmd(
    csv: Vec<PathBuf>,
    synthetic: Vec<String>,
    config_path: Option<PathBuf>,
    output_dir: PathBuf,
    no_save: bool,
) -> Result<()> {
    if csv.is_empty() && synthetic.is_empty() {
        bail!("nothing to run: pass CSV paths and/or --synthetic NAME");
    }

    let config = match config_path {
        Some(path) => RunConfig::from_file(&path)?,
        None => RunConfig::default(),
    };

    let specs: Vec<DatasetSpec> = csv
        .into_iter()
        .map(DatasetSpec::Csv)
        .chain(synthetic.into_iter().map(DatasetSpec::Synthetic))
        .collect();

    let manager = if no_save {
        None
    } else {
        Some(ArtifactManager::new(&output_dir)?)
    };

    let mut failures = 0;
    for (spec, outcome) in specs.iter().zip(run_specs(&config, &specs)) {
        match outcome {
            Ok(result) => {
                print_summary(&result);
                if let Some(manager) = &manager {
                    let paths = manager
                        .save_run(&result)
                        .with_context(|| format!("saving artifacts for {}", result.dataset))?;
                    println!("Artifacts saved to: {}", paths.run_dir.display());
                }
            }
            Err(e) => {
                failures += 1;
                error!(dataset = %spec.label(), "{e}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} dataset(s) failed", specs.len());
    }
    Ok(())
}

fn greeks_cmd(spot: f64, strike: f64, days: f64, rate: f64, vol: f64, kind: Kind) -> Result<()> {
    let params = OptionParams::new(spot, strike, days / 365.0, rate, vol, kind.into());
    let greeks = params.greeks()?;
    let price = params.price()?;
    let output = json!({
        "params": params,
        "price": price,
        "greeks": greeks,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_summary(result: &DatasetResult) {
    let report = &result.report;
    let s = &result.summary;
    println!();
    println!("=== Replay Result ===");
    println!("Dataset:        {}", result.dataset);
    println!("Run id:         {}", &result.run_id[..12.min(result.run_id.len())]);
    println!(
        "Bars:           {} ({} warmup, {} skipped)",
        report.bars_processed,
        report.warmup_bars,
        report.skipped.len()
    );
    println!("Trades:         {}", s.total_trades);
    println!("Hedge adjusts:  {}", report.hedge_adjustments);
    println!("Termination:    {:?}", report.termination);
    println!();
    println!("--- Performance ---");
    println!("Total P&L:      {:.2}", s.total_pnl);
    println!("Final Balance:  {:.2}", s.final_balance);
    println!("Return:         {:.2}%", s.return_pct * 100.0);
    println!("Win Rate:       {:.1}%", s.win_rate * 100.0);
    println!("Avg Win:        {:.2}", s.avg_win);
    println!("Avg Loss:       {:.2}", s.avg_loss);
    println!(
        "Max Drawdown:   {:.2} ({:.2}%)",
        s.max_drawdown,
        s.max_drawdown_pct * 100.0
    );
    println!("Sharpe:         {:.3}", s.sharpe);
    println!("Profit Factor:  {:.2}", s.profit_factor);
    println!("Max Consec Win: {}", s.max_consecutive_wins);
    println!("Max Consec Loss:{}", s.max_consecutive_losses);
    if !s.exit_reasons.is_empty() {
        println!();
        println!("--- Exits ---");
        for (reason, count) in &s.exit_reasons {
            println!("{:<16}{count}", reason.as_str());
        }
    }
    if matches!(result.source, DataSource::Synthetic { .. }) {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
