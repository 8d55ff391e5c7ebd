//! Scan orchestrator: fetch, build history, attach indicators, scan.
//!
//! Symbols fan out over a private rayon pool. Each symbol is independent:
//! a fetch failure is logged, recorded in the report and skipped. Records are
//! merged back in universe order regardless of completion order.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spikescan_core::data::{DataError, DataProvider, FetchResult, FetchWindow, UniverseEntry};
use spikescan_core::{scan, PriceHistory, ResultRecord, ScanParams};
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{RunId, ScanConfig};

/// Errors that abort a whole run. Per-symbol problems never do.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A symbol that produced no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
    /// Fetch attempts made before giving up.
    pub attempts: u32,
}

/// Everything a scan run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub run_id: RunId,
    pub provider: String,
    pub window: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// Universe size.
    pub symbols_total: usize,
    /// Symbols whose history was fetched and scanned.
    pub symbols_scanned: usize,
    pub records: Vec<ResultRecord>,
    pub failures: Vec<SymbolFailure>,
}

impl ScanReport {
    /// Symbols with at least one record.
    pub fn symbols_with_signals(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.symbol.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

enum SymbolOutcome {
    Scanned(Vec<ResultRecord>),
    Failed(SymbolFailure),
}

/// Scan every universe entry.
pub fn run_scan(
    universe: &[UniverseEntry],
    provider: &dyn DataProvider,
    config: &ScanConfig,
) -> Result<ScanReport, RunError> {
    let started_at = Utc::now();
    let clock = Instant::now();
    let run_id = config.run_id();
    let window = config.data.window();
    let params = config.scan_params();

    info!(
        run_id = %&run_id[..12],
        provider = provider.name(),
        symbols = universe.len(),
        %window,
        "scan started"
    );

    let mut builder = rayon::ThreadPoolBuilder::new();
    if config.run.threads > 0 {
        builder = builder.num_threads(config.run.threads);
    }
    let pool = builder.build()?;

    let outcomes: Vec<SymbolOutcome> = pool.install(|| {
        universe
            .par_iter()
            .map(|entry| scan_symbol(entry, provider, &window, &params, config.data.retries))
            .collect()
    });

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut symbols_scanned = 0;
    for outcome in outcomes {
        match outcome {
            SymbolOutcome::Scanned(r) => {
                symbols_scanned += 1;
                records.extend(r);
            }
            SymbolOutcome::Failed(f) => failures.push(f),
        }
    }

    let elapsed_ms = clock.elapsed().as_millis() as u64;
    info!(
        scanned = symbols_scanned,
        failed = failures.len(),
        records = records.len(),
        elapsed_ms,
        "scan finished"
    );

    Ok(ScanReport {
        run_id,
        provider: provider.name().to_string(),
        window: window.to_string(),
        started_at,
        elapsed_ms,
        symbols_total: universe.len(),
        symbols_scanned,
        records,
        failures,
    })
}

fn scan_symbol(
    entry: &UniverseEntry,
    provider: &dyn DataProvider,
    window: &FetchWindow,
    params: &ScanParams,
    retries: u32,
) -> SymbolOutcome {
    let symbol = entry.symbol.as_str();
    let fetched = match fetch_with_retries(provider, symbol, window, retries) {
        Ok(f) => f,
        Err((e, attempts)) => {
            warn!(symbol, attempts, error = %e, "fetch failed, symbol skipped");
            return SymbolOutcome::Failed(SymbolFailure {
                symbol: symbol.to_string(),
                reason: e.to_string(),
                attempts,
            });
        }
    };

    let mut history = PriceHistory::from_unsorted(symbol, fetched.bars);
    history.attach_indicators(&params.indicators);
    match history.date_range() {
        Some((first, last)) => debug!(
            symbol,
            bars = history.len(),
            %first,
            %last,
            source = ?fetched.source,
            "history loaded"
        ),
        None => warn!(symbol, source = ?fetched.source, "provider returned no bars"),
    }

    SymbolOutcome::Scanned(scan(&history, symbol, entry.market_cap, params))
}

/// Fetch a symbol, retrying transient failures up to `retries` extra times.
fn fetch_with_retries(
    provider: &dyn DataProvider,
    symbol: &str,
    window: &FetchWindow,
    retries: u32,
) -> Result<FetchResult, (DataError, u32)> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match provider.fetch(symbol, window) {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt <= retries => {
                debug!(symbol, attempt, error = %e, "transient fetch failure, retrying");
            }
            Err(e) => return Err((e, attempt)),
        }
    }
}
