//! Synthetic data provider for demos and offline development.
//!
//! Produces a weekday-only random walk from a starting price of 100.0 with
//! occasional volume spikes on up days, so a scan over synthetic data
//! actually finds signals. Deterministic per (symbol, window): the RNG is
//! seeded from the BLAKE3 hash of the symbol. Results are tagged
//! `DataSource::Synthetic`.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, FetchWindow};
use crate::domain::PriceBar;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Calendar days generated for `Period::Max`.
const MAX_SPAN_DAYS: u64 = 365 * 10;

pub struct SyntheticProvider {
    /// Last calendar day of generated data; period windows end here.
    anchor: NaiveDate,
    /// Probability that a bar carries a volume spike.
    spike_probability: f64,
}

impl SyntheticProvider {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            spike_probability: 0.04,
        }
    }

    pub fn with_spike_probability(mut self, p: f64) -> Self {
        self.spike_probability = p;
        self
    }

    fn bounds(&self, window: &FetchWindow) -> (NaiveDate, NaiveDate) {
        match *window {
            FetchWindow::Range { start, end } => (start, end),
            FetchWindow::Period(period) => {
                let start = period
                    .start_from(self.anchor)
                    .or_else(|| self.anchor.checked_sub_days(Days::new(MAX_SPAN_DAYS)))
                    .unwrap_or(self.anchor);
                (start, self.anchor)
            }
        }
    }
}

/// Generate weekday bars between `start` and `end` inclusive.
pub fn generate_bars(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    spike_probability: f64,
) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);
    let spike_probability = if (0.0..=1.0).contains(&spike_probability) {
        spike_probability
    } else {
        0.0
    };

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            let spike = rng.gen_bool(spike_probability);
            let daily_return: f64 = if spike {
                rng.gen_range(0.005..0.05)
            } else {
                rng.gen_range(-0.03..0.03)
            };
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let base_volume = rng.gen_range(500_000..1_500_000u64);
            let volume = if spike {
                (base_volume as f64 * rng.gen_range(5.0..10.0)) as u64
            } else {
                base_volume
            };

            bars.push(PriceBar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }

        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    bars
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, window: &FetchWindow) -> Result<FetchResult, DataError> {
        let (start, end) = self.bounds(window);
        let bars = generate_bars(symbol, start, end, self.spike_probability);
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
