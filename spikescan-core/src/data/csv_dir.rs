//! Offline provider backed by a directory of per-symbol CSV files.
//!
//! Layout: `{dir}/{SYMBOL}.csv` with a `Date,Open,High,Low,Close,Volume`
//! header (extra columns such as `Adj Close` are ignored). This is the format
//! written by `download_symbols`, and the one most spreadsheet exports use.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, FetchWindow};
use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

impl From<CsvRow> for PriceBar {
    fn from(row: CsvRow) -> Self {
        PriceBar {
            date: row.date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.map_or(0, |v| v.max(0.0).round() as u64),
        }
    }
}

/// Read bars from CSV. Rows are returned date-sorted; duplicate dates are kept.
pub fn read_bars<R: Read>(symbol: &str, reader: R) -> Result<Vec<PriceBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::Malformed {
            symbol: symbol.to_string(),
            reason: format!("row {}: {e}", line + 1),
        })?;
        bars.push(PriceBar::from(row));
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Write bars as CSV in the layout `read_bars` accepts.
pub fn write_bars<W: Write>(writer: W, bars: &[PriceBar]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        let finite = |v: f64| (!v.is_nan()).then_some(v);
        wtr.serialize(CsvRow {
            date: bar.date,
            open: finite(bar.open),
            high: finite(bar.high),
            low: finite(bar.low),
            close: finite(bar.close),
            volume: Some(bar.volume as f64),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the CSV file for a symbol.
    pub fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<FetchResult, DataError> {
        let path = self.symbol_path(symbol);
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            Err(e) => {
                return Err(DataError::Io {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let bars = window.select(read_bars(symbol, file)?);
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvFile,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::Period;
    use crate::domain::make_bars;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-08-13,101.0,103.0,100.0,102.5,102.5,150000
2024-08-12,100.0,101.0,99.0,100.5,100.5,120000
2024-08-14,102.5,104.0,,103.0,103.0,
";

    #[test]
    fn read_sorts_and_tolerates_gaps() {
        let bars = read_bars("TEST", SAMPLE.as_bytes()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());
        assert_eq!(bars[1].volume, 150_000);
        assert!(bars[2].low.is_nan());
        assert_eq!(bars[2].volume, 0);
    }

    #[test]
    fn read_rejects_bad_date() {
        let bad = "Date,Open,High,Low,Close,Volume\n12/08/2024,1,1,1,1,1\n";
        let err = read_bars("TEST", bad.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }

    #[test]
    fn write_then_fetch_through_provider() {
        let dir = tempfile::tempdir().unwrap();
        let bars = make_bars(&[10.0, 11.0, 12.0], &[100, 200, 300]);
        let provider = CsvDirProvider::new(dir.path());
        let file = std::fs::File::create(provider.symbol_path("ABC")).unwrap();
        write_bars(file, &bars).unwrap();

        let fetched = provider
            .fetch("ABC", &FetchWindow::Period(Period::Max))
            .unwrap();
        assert_eq!(fetched.source, DataSource::CsvFile);
        assert_eq!(fetched.bars, bars);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvDirProvider::new(dir.path());
        assert!(provider.is_available());
        let err = provider.fetch("NONE", &FetchWindow::default()).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }
}
