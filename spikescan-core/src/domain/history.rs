//! PriceHistory: the ordered bars of one symbol plus derived indicator columns.

use super::bar::PriceBar;
use crate::indicators::{AvgVolume, Indicator, IndicatorParams, Rsi};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq)]
pub enum HistoryError {
    #[error("{symbol}: bar {index} ({date}) is earlier than the bar before it")]
    OutOfOrder {
        symbol: String,
        index: usize,
        date: NaiveDate,
    },

    #[error("{symbol}: duplicate bar for {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Columns derived once per history.
///
/// Both series are aligned index-for-index with the bars. Positions before the
/// window is full hold `NaN`.
#[derive(Debug, Clone)]
pub struct DerivedColumns {
    pub params: IndicatorParams,
    /// Trailing mean volume over `params.volume_window` bars, current bar included.
    pub avg_volume: Vec<f64>,
    /// Simple-mean RSI over `params.rsi_window` close-to-close deltas.
    pub rsi: Vec<f64>,
    /// First bar whose previous-day average volume can be defined.
    pub first_signal_index: usize,
}

impl DerivedColumns {
    pub fn compute(bars: &[PriceBar], params: &IndicatorParams) -> Self {
        let avg_volume = AvgVolume::new(params.volume_window);
        let rsi = Rsi::new(params.rsi_window);
        trace!(
            bars = bars.len(),
            avg_volume = avg_volume.name(),
            rsi = rsi.name(),
            "computing derived columns"
        );
        Self {
            params: *params,
            avg_volume: avg_volume.compute(bars),
            rsi: rsi.compute(bars),
            first_signal_index: avg_volume.lookback() + 1,
        }
    }
}

/// Chronological bars for a single symbol.
///
/// Raw bars are immutable after construction; `attach_indicators` only adds
/// the derived columns.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
    derived: Option<DerivedColumns>,
}

impl PriceHistory {
    /// Build a history from bars that are already in strictly ascending date order.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, HistoryError> {
        let symbol = symbol.into();
        for (index, pair) in bars.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            if curr.date == prev.date {
                return Err(HistoryError::DuplicateDate {
                    symbol,
                    date: curr.date,
                });
            }
            if curr.date < prev.date {
                return Err(HistoryError::OutOfOrder {
                    symbol,
                    index: index + 1,
                    date: curr.date,
                });
            }
        }
        Ok(Self {
            symbol,
            bars,
            derived: None,
        })
    }

    /// Build a history from provider output: sort by date and keep the first
    /// bar seen for each date.
    pub fn from_unsorted(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
            derived: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// First and last bar dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.bars.first()?.date, self.bars.last()?.date))
    }

    /// Derived columns, if `attach_indicators` has been called.
    pub fn derived(&self) -> Option<&DerivedColumns> {
        self.derived.as_ref()
    }

    /// Compute and store the average-volume and RSI columns.
    ///
    /// Recomputes if the columns were attached with different parameters.
    pub fn attach_indicators(&mut self, params: &IndicatorParams) {
        if self.derived.as_ref().is_some_and(|d| d.params == *params) {
            return;
        }
        self.derived = Some(DerivedColumns::compute(&self.bars, params));
    }
}
