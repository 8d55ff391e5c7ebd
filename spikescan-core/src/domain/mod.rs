//! Domain types for SpikeScan

pub mod bar;
pub mod history;
pub mod record;

pub use bar::PriceBar;
pub use history::{DerivedColumns, HistoryError, PriceHistory};
pub use record::{ResultRecord, Signal, TradeOutcome, TradeResult};

/// Create bars on consecutive calendar days from closes and volumes.
///
/// open = prev_close (or close for the first bar), high/low = ±1.0 around
/// open/close.
#[cfg(test)]
pub fn make_bars(closes: &[f64], volumes: &[u64]) -> Vec<PriceBar> {
    assert_eq!(closes.len(), volumes.len(), "closes and volumes differ in length");
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect()
}
