//! Result export: CSV records file and JSON run manifest.
//!
//! The CSV layout is fixed; downstream spreadsheets key on the header names.
//! Undefined values (`NaN` RSI, missing market cap) are written as empty cells.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spikescan_core::ResultRecord;

use crate::config::{RunId, ScanConfig};
use crate::runner::{ScanReport, SymbolFailure};

/// Current schema version for the manifest.
pub const SCHEMA_VERSION: u32 = 1;

/// Header of the results CSV, in column order.
pub const RESULT_COLUMNS: [&str; 10] = [
    "Stock Name",
    "Date",
    "RSI",
    "Volume Multiple",
    "Market cap",
    "Max Profit (%)",
    "Max Loss (%)",
    "Time to Max Profit (days)",
    "Time to Max Loss (days)",
    "Trade Result",
];

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// Write records as CSV to any writer.
pub fn write_results<W: Write>(writer: W, records: &[ResultRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(RESULT_COLUMNS)?;

    for r in records {
        wtr.write_record([
            r.symbol.clone(),
            r.date.format("%Y-%m-%d").to_string(),
            cell(r.rsi),
            cell(r.volume_multiple),
            cell(r.market_cap),
            cell(r.max_profit_pct),
            cell(r.max_loss_pct),
            r.time_to_max_profit_days.to_string(),
            r.time_to_max_loss_days.to_string(),
            r.result.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write records to a CSV file, creating parent directories.
pub fn write_results_csv(path: &Path, records: &[ResultRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_results(file, records).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Run metadata written next to the results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub provider: String,
    pub window: String,
    pub config: ScanConfig,
    pub symbols_total: usize,
    pub symbols_scanned: usize,
    pub symbols_with_signals: usize,
    pub record_count: usize,
    pub failures: Vec<SymbolFailure>,
}

impl RunManifest {
    pub fn new(report: &ScanReport, config: &ScanConfig) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: report.run_id.clone(),
            started_at: report.started_at,
            elapsed_ms: report.elapsed_ms,
            provider: report.provider.clone(),
            window: report.window.clone(),
            config: config.clone(),
            symbols_total: report.symbols_total,
            symbols_scanned: report.symbols_scanned,
            symbols_with_signals: report.symbols_with_signals(),
            record_count: report.records.len(),
            failures: report.failures.clone(),
        }
    }
}

/// Serialize a manifest to pretty JSON and write it to `path`.
pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Read a manifest back, rejecting unknown schema versions.
pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("failed to deserialize manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// Manifest path for a results file: `results.csv` → `results.manifest.json`.
pub fn manifest_path(results: &Path) -> std::path::PathBuf {
    results.with_extension("manifest.json")
}
