//! Download orchestrator: fetches symbols and stores them as CSV files that
//! `CsvDirProvider` can replay offline.

use super::csv_dir::{write_bars, CsvDirProvider};
use super::provider::{DataError, DataProvider, DownloadProgress, FetchWindow};
use crate::domain::PriceHistory;
use std::path::Path;

/// Download multiple symbols into `out_dir`, one `{SYMBOL}.csv` per symbol.
///
/// Failures never stop the batch, except a tripped circuit breaker, which
/// marks every remaining symbol as failed.
pub fn download_symbols(
    provider: &dyn DataProvider,
    out_dir: &Path,
    symbols: &[&str],
    window: &FetchWindow,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    let target = CsvDirProvider::new(out_dir);
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        for sym in symbols {
            errors.push((
                sym.to_string(),
                DataError::Io {
                    path: out_dir.display().to_string(),
                    reason: e.to_string(),
                },
            ));
        }
        progress.on_batch_complete(0, total, total);
        return DownloadSummary {
            total,
            succeeded: 0,
            failed: total,
            errors,
        };
    }

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let result = download_single(provider, &target, symbol, window);
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..total] {
                errors.push((sym.to_string(), DataError::CircuitBreakerTripped));
                failed += 1;
            }
            break;
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

/// Download a single symbol: fetch → normalise → write.
fn download_single(
    provider: &dyn DataProvider,
    target: &CsvDirProvider,
    symbol: &str,
    window: &FetchWindow,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol, window)?;
    let history = PriceHistory::from_unsorted(symbol, fetched.bars);
    let path = target.symbol_path(symbol);
    let io_err = |reason: String| DataError::Io {
        path: path.display().to_string(),
        reason,
    };
    let file = std::fs::File::create(&path).map_err(|e| io_err(e.to_string()))?;
    write_bars(file, history.bars()).map_err(|e| io_err(e.to_string()))
}

/// Summary of a batch download operation.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
