//! Simple moving average, used for the trailing average volume.
//!
//! First defined value at index window-1.

use super::{rolling::RollingMean, Indicator};
use crate::domain::PriceBar;

/// Trailing simple mean of `values` over `window` entries, current entry included.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; values.len()];
    }
    let mut acc = RollingMean::new(window);
    values.iter().map(|&v| acc.push(v)).collect()
}

/// Trailing average of bar volume.
#[derive(Debug, Clone)]
pub struct AvgVolume {
    window: usize,
    name: String,
}

impl AvgVolume {
    /// A zero window is accepted and yields an all-undefined series.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("avg_volume_{window}"),
        }
    }
}

impl Indicator for AvgVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        rolling_mean(&volumes, self.window)
    }
}
