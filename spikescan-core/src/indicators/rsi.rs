//! Relative Strength Index (RSI), simple-mean variant.
//!
//! Average gain and average loss are trailing simple means of the last
//! `window` close-to-close changes (not Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: window (the first change exists at index 1).
//! Edge case: avg_loss == 0 → RSI = 100, including a flat window.

use super::{rolling::RollingMean, Indicator};
use crate::domain::PriceBar;

/// RSI of a close-price series, aligned index-for-index with the input.
///
/// Positions `0..window` are `NaN`. A `NaN` close makes every window that
/// contains one of its changes `NaN`.
pub fn compute_rsi(closes: &[f64], window: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n <= window {
        return result;
    }

    let mut gains = RollingMean::new(window);
    let mut losses = RollingMean::new(window);

    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change.is_nan() {
            (f64::NAN, f64::NAN)
        } else {
            (change.max(0.0), (-change).max(0.0))
        };

        let avg_gain = gains.push(gain);
        let avg_loss = losses.push(loss);
        if avg_gain.is_nan() || avg_loss.is_nan() {
            continue;
        }
        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let avg_gain = avg_gain.max(0.0);
    let avg_loss = avg_loss.max(0.0);
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    /// A zero window is accepted and yields an all-undefined series.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("rsi_{window}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        compute_rsi(&closes, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains() {
        let result = compute_rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let result = compute_rsi(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0], 3);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        let result = compute_rsi(&[50.0; 6], 3);
        assert_eq!(result[3], 100.0);
        assert_eq!(result[5], 100.0);
    }

    #[test]
    fn rsi_mixed_simple_mean() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // window=3 at index 3: gains 0.34, losses 0.73 → RS = 0.34/0.73
        // window=3 at index 4: gains 0.72, losses 0.73 → RS = 0.72/0.73
        let result = compute_rsi(&[44.0, 44.34, 44.09, 43.61, 44.33], 3);
        let rs3: f64 = 0.34 / 0.73;
        let rs4: f64 = 0.72 / 0.73;
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + rs3), 1e-9);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + rs4), 1e-9);
    }

    #[test]
    fn rsi_window_slides() {
        // Loss only in the first change; once it leaves the window RSI is 100 again.
        let result = compute_rsi(&[10.0, 9.0, 10.0, 11.0, 12.0], 2);
        assert!(result[2] < 100.0);
        assert_eq!(result[3], 100.0);
        assert_eq!(result[4], 100.0);
    }

    #[test]
    fn rsi_bounds() {
        let result = compute_rsi(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0], 3);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let result = compute_rsi(&[100.0, 101.0, f64::NAN, 103.0, 104.0, 105.0, 106.0], 2);
        // changes at 2 and 3 involve the NaN close
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_short_input_all_nan() {
        let result = compute_rsi(&[1.0, 2.0, 3.0], 3);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|v| v.is_nan()));
        assert!(compute_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_indicator_over_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0], &[10; 4]);
        let rsi = Rsi::new(2);
        assert_eq!(rsi.lookback(), 2);
        assert_eq!(rsi.name(), "rsi_2");
        let values = rsi.compute(&bars);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 100.0);
    }

    #[test]
    fn rsi_zero_window_is_undefined() {
        let bars = make_bars(&[1.0, 2.0, 3.0], &[10; 3]);
        let values = Rsi::new(0).compute(&bars);
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_nan()));
    }
}
