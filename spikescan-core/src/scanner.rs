//! Signal scanner: volume spike confirmed by an up close.
//!
//! A bar `i` triggers when
//! - `volume[i] / avg_volume[i-1] > volume_threshold` (the average ends at the
//!   previous bar, so the spike is measured against the run-up to today), and
//! - `close[i] > close[i-1]`.
//!
//! Every trigger is simulated independently; there is no cooldown, so
//! adjacent triggers produce overlapping trade windows.
//!
//! Bars whose previous-day average volume is zero or undefined never trigger.

use crate::domain::{DerivedColumns, PriceHistory, ResultRecord, Signal};
use crate::indicators::IndicatorParams;
use crate::simulator::{simulate, TradeParams};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Trigger-rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// First bar index evaluated.
    pub first_index: usize,
    /// Strict lower bound on the volume multiple.
    pub volume_threshold: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            first_index: 10,
            volume_threshold: 4.0,
        }
    }
}

/// Everything the scanner needs for one history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanParams {
    pub indicators: IndicatorParams,
    pub signal: SignalParams,
    pub trade: TradeParams,
}

/// Volume multiple of bar `i` against the average ending at bar `i-1`.
///
/// `None` when `i == 0` or the prior average is zero, negative or undefined.
pub fn volume_multiple(history: &PriceHistory, avg_volume: &[f64], i: usize) -> Option<f64> {
    let prior_avg = *avg_volume.get(i.checked_sub(1)?)?;
    if prior_avg.is_nan() || prior_avg <= 0.0 {
        return None;
    }
    let volume = history.bars().get(i)?.volume as f64;
    Some(volume / prior_avg)
}

/// Find every trigger bar of `history`.
pub fn detect_signals(
    history: &PriceHistory,
    symbol: &str,
    derived: &DerivedColumns,
    params: &SignalParams,
) -> Vec<Signal> {
    let bars = history.bars();
    let start = params.first_index.max(derived.first_signal_index);
    let mut signals = Vec::new();

    for i in start..bars.len() {
        let Some(multiple) = volume_multiple(history, &derived.avg_volume, i) else {
            trace!(symbol, index = i, "prior average volume undefined or zero, bar skipped");
            continue;
        };

        if multiple > params.volume_threshold && bars[i].close > bars[i - 1].close {
            signals.push(Signal {
                symbol: symbol.to_string(),
                index: i,
                date: bars[i].date,
                rsi: derived.rsi.get(i).copied().unwrap_or(f64::NAN),
                volume_multiple: multiple,
            });
        }
    }

    signals
}

/// Scan a history and simulate a trade after every signal.
///
/// Uses the derived columns attached to `history` when they were computed with
/// `params.indicators`; otherwise computes them locally without touching the
/// history. Records come out in chronological order.
pub fn scan(
    history: &PriceHistory,
    symbol: &str,
    market_cap: f64,
    params: &ScanParams,
) -> Vec<ResultRecord> {
    let derived = match history.derived() {
        Some(d) if d.params == params.indicators => Cow::Borrowed(d),
        _ => Cow::Owned(DerivedColumns::compute(history.bars(), &params.indicators)),
    };

    let signals = detect_signals(history, symbol, &derived, &params.signal);
    if signals.is_empty() {
        debug!(symbol, bars = history.len(), "no signals");
        return Vec::new();
    }

    let closes = history.closes();
    let records: Vec<ResultRecord> = signals
        .into_iter()
        .map(|signal| {
            let outcome = simulate(&closes, signal.index, &params.trade);
            ResultRecord::new(signal, market_cap, outcome)
        })
        .collect();

    debug!(symbol, bars = history.len(), signals = records.len(), "scan complete");
    records
}
