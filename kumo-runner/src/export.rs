//! Reporting and export: JSON, CSV, and Markdown artifacts.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade log and equity curve for external analysis and plotting
//! - **Markdown**: a human-readable single-run report
//!
//! Persisted manifests carry `schema_version`. Newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use kumo_core::{EquityPoint, ExitReason, PositionSide, SizingRule, TradeRecord};
use tracing::info;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn side_label(side: PositionSide) -> &'static str {
    match side {
        PositionSide::Long => "long",
        PositionSide::Short => "short",
    }
}

fn exit_label(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::StopLoss => "stop_loss",
        ExitReason::OppositeSignal => "opposite_signal",
    }
}

fn sizing_label(rule: SizingRule) -> &'static str {
    match rule {
        SizingRule::RiskBudget => "risk_budget",
        SizingRule::DegenerateVolatility => "degenerate_volatility",
    }
}

/// Export the trade ledger as CSV.
///
/// Columns: side, entry_bar, entry_time, entry_price, exit_bar, exit_time,
/// exit_price, exit_reason, stop_loss, size, sizing, profit, return_pct,
/// bars_held
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "exit_reason",
        "stop_loss",
        "size",
        "sizing",
        "profit",
        "return_pct",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            side_label(t.side).to_string(),
            t.entry_bar.to_string(),
            t.entry_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.6}", t.entry_price),
            t.exit_bar.to_string(),
            t.exit_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.6}", t.exit_price),
            exit_label(t.exit_reason).to_string(),
            format!("{:.6}", t.stop_loss),
            format!("{:.6}", t.size),
            sizing_label(t.sizing).to_string(),
            format!("{:.2}", t.profit),
            format!("{:.4}", t.return_pct()),
            t.bars_held().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as `timestamp,equity`.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity"])?;
    for point in equity_curve {
        wtr.write_record([
            point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.2}", point.equity),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates `{symbol}_{run_id prefix}/` under `output_dir` containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: trade log
/// - `equity.csv`: mark-to-market equity per bar
/// - `report.md`: Markdown summary
///
/// Saving the same configuration twice overwrites the same directory.
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix = result.run_id.get(..12).unwrap_or(&result.run_id);
    let run_dir = output_dir.join(format!("{}_{prefix}", result.symbol));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write_file(
        &run_dir.join("trades.csv"),
        &export_trades_csv(&result.simulation.trades)?,
    )?;
    write_file(
        &run_dir.join("equity.csv"),
        &export_equity_csv(&result.simulation.equity_curve)?,
    )?;
    write_file(&run_dir.join("report.md"), &generate_report(result))?;

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

fn fmt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);
    let sim = &result.simulation;
    let r = &result.report;
    let cfg = &result.config;

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    if let (Some(first), Some(last)) = (sim.equity_curve.first(), sim.equity_curve.last()) {
        md.push_str(&format!(
            "| Period | {} to {} |\n",
            first.timestamp.date(),
            last.timestamp.date()
        ));
    }
    md.push_str(&format!(
        "| Bars | {} simulated ({} loaded, {} warm-up) |\n",
        result.bars_simulated(),
        result.bars_loaded,
        result.warmup_dropped
    ));
    md.push_str(&format!("| Initial Capital | {:.2} |\n", sim.initial_capital));
    md.push_str(&format!(
        "| Risk | {:.2}% per trade, stop {}x volatility range |\n",
        cfg.risk.risk_fraction * 100.0,
        cfg.risk.stop_multiplier
    ));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Final Capital | {:.2} |\n", sim.final_capital));
    md.push_str(&format!("| Total Return | {:.2}% |\n", r.total_return_pct));
    md.push_str(&format!("| Trades | {} |\n", r.trade_count));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", r.win_rate_pct));
    md.push_str(&format!("| Average Win | {} |\n", fmt_money(r.avg_win)));
    md.push_str(&format!("| Average Loss | {} |\n", fmt_money(r.avg_loss)));
    md.push_str(&format!("| Risk/Reward | {} |\n", r.risk_reward));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", r.max_drawdown_pct));
    md.push('\n');

    let mut notes = Vec::new();
    if let Some(pos) = &sim.open_position {
        notes.push(format!(
            "Position still open at end of series: {} {:.4} @ {:.2} (stop {:.2}), not included in trade statistics.",
            side_label(pos.side),
            pos.size,
            pos.entry_price,
            pos.stop_loss
        ));
    }
    if sim.degenerate_sizing_count > 0 {
        notes.push(format!(
            "{} entr{} sized by the zero-volatility fallback.",
            sim.degenerate_sizing_count,
            if sim.degenerate_sizing_count == 1 { "y was" } else { "ies were" }
        ));
    }
    if !notes.is_empty() {
        md.push_str("## Notes\n\n");
        for note in &notes {
            md.push_str(&format!("- {note}\n"));
        }
        md.push('\n');
    }

    md
}
