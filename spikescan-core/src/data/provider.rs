//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, a
//! directory of CSV files, synthetic data) so the run orchestrator can swap
//! implementations and tests can mock them.

use crate::domain::PriceBar;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Any of these means the symbol's history could not be retrieved; the
/// orchestrator skips the symbol and carries on.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed price data for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } | DataError::Other(_)
        )
    }
}

/// Trailing look-back period, in the vocabulary of the Yahoo chart API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    pub const ALL: [Period; 8] = [
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// First calendar date covered by this period when it ends at `end`.
    ///
    /// `None` for `Max` (no lower bound).
    pub fn start_from(&self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::FiveDays => end.checked_sub_days(Days::new(5)),
            Period::OneMonth => end.checked_sub_months(Months::new(1)),
            Period::ThreeMonths => end.checked_sub_months(Months::new(3)),
            Period::SixMonths => end.checked_sub_months(Months::new(6)),
            Period::OneYear => end.checked_sub_months(Months::new(12)),
            Period::TwoYears => end.checked_sub_months(Months::new(24)),
            Period::FiveYears => end.checked_sub_months(Months::new(60)),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| {
                let valid: Vec<&str> = Period::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown period '{s}' (valid: {})", valid.join(", "))
            })
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.as_str().to_string()
    }
}

/// Which daily bars to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchWindow {
    /// Trailing period ending at the most recent bar.
    Period(Period),
    /// Explicit inclusive date range.
    Range { start: NaiveDate, end: NaiveDate },
}

impl FetchWindow {
    /// Keep the bars this window covers. `bars` must be date-sorted.
    ///
    /// Period windows are anchored at the last bar, not at today.
    pub fn select(&self, bars: Vec<PriceBar>) -> Vec<PriceBar> {
        match *self {
            FetchWindow::Range { start, end } => bars
                .into_iter()
                .filter(|b| b.date >= start && b.date <= end)
                .collect(),
            FetchWindow::Period(period) => {
                let Some(last) = bars.last().map(|b| b.date) else {
                    return bars;
                };
                match period.start_from(last) {
                    Some(start) => bars.into_iter().filter(|b| b.date > start).collect(),
                    None => bars,
                }
            }
        }
    }
}

impl Default for FetchWindow {
    fn default() -> Self {
        FetchWindow::Period(Period::OneMonth)
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchWindow::Period(p) => write!(f, "{p}"),
            FetchWindow::Range { start, end } => write!(f, "{start}..={end}"),
        }
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvFile,
    Synthetic,
}

/// Trait for data providers.
///
/// `fetch` is a blocking call returning the complete daily history for the
/// window, or an error. Providers hold no per-symbol state, so a single
/// provider is shared by every worker of a run.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol.
    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-symbol operations.
pub trait DownloadProgress: Send + Sync {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;

    #[test]
    fn period_parse_roundtrip() {
        for p in Period::ALL {
            assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
        }
        assert!("2mo".parse::<Period>().is_err());
    }

    #[test]
    fn period_serde_uses_api_strings() {
        let json = serde_json::to_string(&Period::OneMonth).unwrap();
        assert_eq!(json, "\"1mo\"");
        let p: Period = serde_json::from_str("\"6mo\"").unwrap();
        assert_eq!(p, Period::SixMonths);
    }

    #[test]
    fn period_start_from() {
        let end = NaiveDate::from_ymd_opt(2024, 9, 13).unwrap();
        assert_eq!(
            Period::OneMonth.start_from(end),
            NaiveDate::from_ymd_opt(2024, 8, 13)
        );
        assert_eq!(Period::Max.start_from(end), None);
    }

    #[test]
    fn period_window_anchors_at_last_bar() {
        // 60 consecutive days from 2024-08-01; last bar 2024-09-29.
        let bars = make_bars(&[100.0; 60], &[1; 60]);
        let kept = FetchWindow::Period(Period::OneMonth).select(bars);
        assert_eq!(kept.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 8, 30).unwrap());
        assert_eq!(kept.last().unwrap().date, NaiveDate::from_ymd_opt(2024, 9, 29).unwrap());
    }

    #[test]
    fn range_window_is_inclusive() {
        let bars = make_bars(&[100.0; 10], &[1; 10]);
        let window = FetchWindow::Range {
            start: NaiveDate::from_ymd_opt(2024, 8, 3).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
        };
        assert_eq!(window.select(bars).len(), 3);
    }

    #[test]
    fn transient_errors() {
        assert!(DataError::NetworkUnreachable("x".into()).is_transient());
        assert!(!DataError::CircuitBreakerTripped.is_transient());
        assert!(!DataError::SymbolNotFound { symbol: "X".into() }.is_transient());
    }
}
