//! Kumo CLI: single backtests and risk-parameter sweeps.
//!
//! Commands:
//! - `run`: backtest a CSV (or synthetic) series and save artifacts
//! - `sweep`: run a grid of risk fractions and stop multipliers in parallel

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kumo_core::PositionSide;
use kumo_runner::{
    load_csv, run_pipeline, save_artifacts, synthetic_series, BacktestConfig, BacktestResult,
    LoadedSeries, ParamGrid, ParamSweep,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kumo", about = "Kumo CLI: cloud-trend backtesting engine")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one configuration.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Starting capital.
        #[arg(long)]
        initial_capital: Option<f64>,

        /// Fraction of capital risked per trade (e.g. 0.01).
        #[arg(long)]
        risk_fraction: Option<f64>,

        /// Stop distance in multiples of the volatility range.
        #[arg(long)]
        stop_multiplier: Option<f64>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write nothing.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Backtest every combination of risk fraction and stop multiplier.
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated risk fractions.
        #[arg(long, value_delimiter = ',', default_values_t = [0.005, 0.01, 0.02])]
        risk_fractions: Vec<f64>,

        /// Comma-separated stop multipliers.
        #[arg(long, value_delimiter = ',', default_values_t = [1.5, 2.0, 3.0])]
        stop_multipliers: Vec<f64>,

        /// Run configurations one at a time.
        #[arg(long, default_value_t = false)]
        serial: bool,

        /// Number of rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

/// Where the configuration and bars come from.
#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// OHLCV CSV file (overrides `backtest.data`).
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Generate this many synthetic bars instead of loading a file.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Symbol label (overrides `backtest.symbol`).
    #[arg(long)]
    symbol: Option<String>,
}

impl SourceArgs {
    fn base_config(&self) -> Result<BacktestConfig> {
        let mut config = match &self.config {
            Some(path) => BacktestConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BacktestConfig::default(),
        };
        if let Some(data) = &self.data {
            config.backtest.data = Some(data.clone());
        }
        if let Some(symbol) = &self.symbol {
            config.backtest.symbol = symbol.clone();
        }
        Ok(config)
    }

    fn load_series(&self, config: &BacktestConfig) -> Result<LoadedSeries> {
        match self.synthetic {
            Some(n) => Ok(synthetic_series(n, self.seed)),
            None => {
                let path = config
                    .data_path()
                    .context("pass --data, --synthetic, or set backtest.data in the config")?;
                load_csv(path).with_context(|| format!("loading {}", path.display()))
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            source,
            initial_capital,
            risk_fraction,
            stop_multiplier,
            output_dir,
            no_save,
        } => {
            let mut config = source.base_config()?;
            if let Some(capital) = initial_capital {
                config.backtest.initial_capital = capital;
            }
            let risk = risk_fraction.unwrap_or(config.risk.risk_fraction);
            let mult = stop_multiplier.unwrap_or(config.risk.stop_multiplier);
            let config = config.with_risk(risk, mult);
            config.validate()?;

            let series = source.load_series(&config)?;
            let result = run_pipeline(&series, &config)?;
            print_summary(&result);

            if !no_save {
                let run_dir = save_artifacts(&result, &output_dir)?;
                println!("Artifacts saved to: {}", run_dir.display());
            }
            Ok(())
        }
        Commands::Sweep {
            source,
            risk_fractions,
            stop_multipliers,
            serial,
            top,
        } => {
            let config = source.base_config()?;
            let series = source.load_series(&config)?;
            let grid = ParamGrid {
                risk_fractions,
                stop_multipliers,
            };
            let results = ParamSweep::new(config)
                .with_parallelism(!serial)
                .sweep(&series, &grid)?;
            print_sweep(&results.sorted_by_return(), top);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fmt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_summary(result: &BacktestResult) {
    let sim = &result.simulation;
    let r = &result.report;

    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    if let (Some(first), Some(last)) = (sim.equity_curve.first(), sim.equity_curve.last()) {
        println!(
            "Period:         {} to {}",
            first.timestamp.date(),
            last.timestamp.date()
        );
    }
    println!(
        "Bars:           {} ({} warmup)",
        result.bars_simulated(),
        result.warmup_dropped
    );
    println!("Trades:         {}", r.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", sim.initial_capital);
    println!("Final:          {:.2}", sim.final_capital);
    println!("Total Return:   {:.2}%", r.total_return_pct);
    println!("Win Rate:       {:.1}%", r.win_rate_pct);
    println!("Avg Win:        {}", fmt_money(r.avg_win));
    println!("Avg Loss:       {}", fmt_money(r.avg_loss));
    println!("Risk/Reward:    {}", r.risk_reward);
    println!("Max Drawdown:   {:.2}%", r.max_drawdown_pct);

    if let Some(pos) = &sim.open_position {
        let side = match pos.side {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        };
        println!();
        println!(
            "Open position:  {side} {:.4} @ {:.2} (stop {:.2}), excluded from trade stats",
            pos.size, pos.entry_price, pos.stop_loss
        );
    }
    if sim.has_degenerate_sizing() {
        println!(
            "WARNING: {} entries sized by the zero-volatility fallback",
            sim.degenerate_sizing_count
        );
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_sweep(sorted: &[&BacktestResult], top: usize) {
    println!();
    println!(
        "{:<6} {:<6} {:>8} {:>7} {:>8} {:>8} {:>9}  {}",
        "Risk", "Stop", "Return%", "Trades", "WinRate", "R/R", "MaxDD%", "Run"
    );
    println!("{}", "-".repeat(72));
    for r in sorted.iter().take(top) {
        println!(
            "{:<6} {:<6} {:>8.2} {:>7} {:>8.1} {:>8} {:>9.2}  {}",
            format!("{:.3}", r.config.risk.risk_fraction),
            format!("{:.2}", r.config.risk.stop_multiplier),
            r.report.total_return_pct,
            r.report.trade_count,
            r.report.win_rate_pct,
            r.report.risk_reward.to_string(),
            r.report.max_drawdown_pct,
            r.run_id.get(..12).unwrap_or(&r.run_id),
        );
    }
    if sorted.len() > top {
        println!("... {} more", sorted.len() - top);
    }
    println!();
}
