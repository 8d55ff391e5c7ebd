//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Symbols in the universe file are bare exchange tickers; the provider
//! appends a listing suffix (".NS" for the National Stock Exchange of India
//! by default) before querying.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource, FetchResult, FetchWindow};
use crate::domain::PriceBar;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default listing suffix.
pub const DEFAULT_SUFFIX: &str = ".NS";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC, in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    suffix: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            suffix: DEFAULT_SUFFIX.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Listing suffix appended to every symbol (may be empty).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Transport-level retries for one fetch (429, 5xx, timeouts).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn ticker(&self, symbol: &str) -> String {
        format!("{symbol}{}", self.suffix)
    }

    /// Build the chart API URL for a ticker and window.
    fn chart_url(ticker: &str, window: &FetchWindow) -> String {
        let base = format!("https://query2.finance.yahoo.com/v8/finance/chart/{ticker}");
        match window {
            FetchWindow::Period(period) => format!("{base}?range={period}&interval=1d"),
            FetchWindow::Range { start, end } => {
                let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
                // period2 is exclusive: midnight after the end date
                let end_ts = end
                    .checked_add_days(Days::new(1))
                    .unwrap_or(*end)
                    .and_time(NaiveTime::MIN)
                    .and_utc()
                    .timestamp();
                format!("{base}?period1={start_ts}&period2={end_ts}&interval=1d")
            }
        }
    }

    /// Parse a chart API response body into bars.
    fn parse_response(symbol: &str, body: &str) -> Result<Vec<PriceBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let timestamps = data.timestamp.ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Bars are stamped at the exchange open; shift to exchange-local time
            // so the calendar date is the trading day.
            let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays and non-trading days come back as all-null rows
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    /// Execute the HTTP request with retry and circuit breaker logic.
    fn fetch_with_retry(&self, symbol: &str, window: &FetchWindow) -> Result<Vec<PriceBar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            let cooldown = self.circuit_breaker.remaining_cooldown();
            debug!(symbol, ?cooldown, "circuit breaker open, request refused");
            return Err(DataError::CircuitBreakerTripped);
        }

        let ticker = self.ticker(symbol);
        let url = Self::chart_url(&ticker, window);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(%ticker, attempt, ?delay, "retrying chart request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                warn!(%ticker, "HTTP 403 from Yahoo, tripping circuit breaker");
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            // Unknown tickers come back as 404 with a JSON error body
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: ticker.clone(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {ticker}")));
                continue;
            }

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
            let bars = Self::parse_response(&ticker, &body)?;
            self.circuit_breaker.record_success();
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<FetchResult, DataError> {
        let bars = self.fetch_with_retry(symbol, window)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
