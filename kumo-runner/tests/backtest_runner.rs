//! Integration tests for the runner: TOML config plus CSV file on disk,
//! through annotation, simulation and the performance report.

use std::io::Write;
use std::path::Path;

use kumo_core::Bar;
use kumo_runner::config::BacktestConfig;
use kumo_runner::data_loader::{load_csv, synthetic_bars};
use kumo_runner::runner::{run_backtest, RunError};
use kumo_runner::LoadError;

fn write_csv(path: &Path, bars: &[Bar]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    for b in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            b.timestamp.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        )
        .unwrap();
    }
}

const CONFIG: &str = r#"
[backtest]
data = "prices.csv"
symbol = "TEST"
initial_capital = 10000.0

[risk]
risk_fraction = 0.01
stop_multiplier = 2.0

[indicators]
trend_period = 50
"#;

fn setup(bars: usize) -> (tempfile::TempDir, BacktestConfig) {
    let dir = tempfile::tempdir().unwrap();
    write_csv(&dir.path().join("prices.csv"), &synthetic_bars(bars, 7));
    let config_path = dir.path().join("backtest.toml");
    std::fs::write(&config_path, CONFIG).unwrap();
    let config = BacktestConfig::from_file(&config_path).unwrap();
    (dir, config)
}

#[test]
fn backtest_from_config_file() {
    let (_dir, config) = setup(400);
    let result = run_backtest(&config).unwrap();

    assert_eq!(result.symbol, "TEST");
    assert!(!result.has_synthetic);
    assert_eq!(result.bars_loaded, 400);
    assert_eq!(result.warmup_dropped + result.bars_simulated(), 400);
    assert_eq!(
        result.simulation.equity_curve.len(),
        result.bars_simulated() + 1
    );
    assert_eq!(result.report.trade_count, result.simulation.trades.len());
    assert_eq!(result.run_id, config.run_id());
}

#[test]
fn csv_round_trip_preserves_dataset_hash() {
    let (dir, config) = setup(300);
    let loaded = load_csv(&dir.path().join("prices.csv")).unwrap();
    let result = run_backtest(&config).unwrap();
    assert_eq!(result.dataset_hash, loaded.dataset_hash);
}

#[test]
fn realized_capital_matches_trade_ledger() {
    let (_dir, config) = setup(500);
    let result = run_backtest(&config).unwrap();
    let realized: f64 = result.simulation.trades.iter().map(|t| t.profit).sum();
    assert!(
        (result.simulation.final_capital - (10_000.0 + realized)).abs() < 1e-6,
        "final capital {} != initial + realized {}",
        result.simulation.final_capital,
        10_000.0 + realized
    );
}

#[test]
fn missing_data_file_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("backtest.toml");
    std::fs::write(&config_path, CONFIG).unwrap();
    let config = BacktestConfig::from_file(&config_path).unwrap();

    let err = run_backtest(&config).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::Io { .. })));
}

#[test]
fn series_too_short_for_indicators_fails() {
    let (_dir, config) = setup(40);
    let err = run_backtest(&config).unwrap_err();
    assert!(matches!(err, RunError::Simulation(_)));
}
