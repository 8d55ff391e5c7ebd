//! Universe loader: the symbols to scan and their market capitalisation.
//!
//! The universe is a CSV file with at least a `Symbol` and a `Market cap`
//! column (screener exports carry many more; they are ignored). Input order
//! is preserved and defines the order of the scan output.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("parse universe CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row} ({symbol}): market cap '{value}' is not a number")]
    BadMarketCap {
        row: usize,
        symbol: String,
        value: String,
    },

    #[error("universe contains no symbols")]
    Empty,
}

/// One symbol of the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseEntry {
    pub symbol: String,
    /// Market capitalisation as listed; `NaN` when the cell is empty.
    pub market_cap: f64,
}

#[derive(Debug, Deserialize)]
struct UniverseRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Market cap", default)]
    market_cap: String,
}

/// Load a universe from a CSV file.
pub fn load_universe(path: &Path) -> Result<Vec<UniverseEntry>, UniverseError> {
    let file = std::fs::File::open(path).map_err(|e| UniverseError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_universe(file)
}

/// Parse a universe from CSV. Rows with an empty symbol are skipped.
pub fn parse_universe<R: Read>(reader: R) -> Result<Vec<UniverseEntry>, UniverseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (i, row) in rdr.deserialize::<UniverseRow>().enumerate() {
        let row = row?;
        let line = i + 2; // header is line 1
        if row.symbol.is_empty() {
            warn!(line, "universe row without a symbol, skipped");
            continue;
        }
        let market_cap =
            parse_market_cap(&row.market_cap).ok_or_else(|| UniverseError::BadMarketCap {
                row: line,
                symbol: row.symbol.clone(),
                value: row.market_cap.clone(),
            })?;
        entries.push(UniverseEntry {
            symbol: row.symbol,
            market_cap,
        });
    }

    if entries.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(entries)
}

/// Parse a market-cap cell, accepting thousands separators (`1,23,456.7`).
fn parse_market_cap(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
    if cleaned.is_empty() {
        return Some(f64::NAN);
    }
    cleaned.parse().ok()
}
