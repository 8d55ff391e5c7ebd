//! Indicator implementations.
//!
//! Indicators are pure functions: a series in, a series of the same length
//! out. Warm-up positions are `f64::NAN`. They are computed once per
//! `PriceHistory` and read by index during the scan.

pub mod rolling;
pub mod rsi;
pub mod sma;

pub use rolling::RollingMean;
pub use rsi::{compute_rsi, Rsi};
pub use sma::{rolling_mean, AvgVolume};

use crate::domain::PriceBar;
use serde::{Deserialize, Serialize};

/// Trait for bar-series indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "avg_volume_9").
    fn name(&self) -> &str;

    /// Index of the first defined output value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Window sizes for the derived columns of a `PriceHistory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_window: usize,
    pub volume_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_window: 14,
            volume_window: 9,
        }
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
