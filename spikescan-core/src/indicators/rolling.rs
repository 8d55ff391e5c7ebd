//! Sliding-window mean accumulator.
//!
//! O(1) amortized per update: the running sum is adjusted by the entering and
//! leaving values instead of re-summing the window.

use std::collections::VecDeque;

/// Trailing simple mean over a fixed number of values.
///
/// `push` returns `NaN` until the window is full, and while any `NaN` value is
/// inside the window. A window holding only zeros yields exactly `0.0`, so
/// floating-point residue from values that already left the window never
/// leaks into the mean.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
    sum: f64,
    nan_count: usize,
    nonzero_count: usize,
}

impl RollingMean {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "rolling window must be >= 1");
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
            nan_count: 0,
            nonzero_count: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// True once `window` values have been pushed.
    pub fn is_full(&self) -> bool {
        self.values.len() == self.window
    }

    /// Push the next value and return the mean of the current window.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.is_full() {
            if let Some(leaving) = self.values.pop_front() {
                self.forget(leaving);
            }
        }

        if value.is_nan() {
            self.nan_count += 1;
        } else {
            self.sum += value;
            if value != 0.0 {
                self.nonzero_count += 1;
            }
        }
        self.values.push_back(value);

        self.mean()
    }

    /// Mean of the current window (`NaN` if not full or poisoned).
    pub fn mean(&self) -> f64 {
        if !self.is_full() || self.nan_count > 0 {
            return f64::NAN;
        }
        if self.nonzero_count == 0 {
            return 0.0;
        }
        self.sum / self.window as f64
    }

    fn forget(&mut self, value: f64) {
        if value.is_nan() {
            self.nan_count -= 1;
            return;
        }
        self.sum -= value;
        if value != 0.0 {
            self.nonzero_count -= 1;
        }
        if self.nonzero_count == 0 {
            self.sum = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn nan_until_full() {
        let mut rm = RollingMean::new(3);
        assert!(rm.push(1.0).is_nan());
        assert!(rm.push(2.0).is_nan());
        assert_approx(rm.push(3.0), 2.0, DEFAULT_EPSILON);
        assert_approx(rm.push(4.0), 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_poisons_only_its_windows() {
        let mut rm = RollingMean::new(2);
        rm.push(1.0);
        assert!(rm.push(f64::NAN).is_nan());
        assert!(rm.push(5.0).is_nan());
        assert_approx(rm.push(7.0), 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn all_zero_window_is_exact_zero() {
        let mut rm = RollingMean::new(2);
        rm.push(0.1);
        rm.push(0.2);
        rm.push(0.0);
        assert_eq!(rm.push(0.0), 0.0);
    }

    #[test]
    fn window_of_one_tracks_input() {
        let mut rm = RollingMean::new(1);
        assert_eq!(rm.push(4.0), 4.0);
        assert_eq!(rm.push(9.0), 9.0);
        assert_eq!(rm.window(), 1);
    }

    #[test]
    #[should_panic(expected = "rolling window must be >= 1")]
    fn zero_window_panics() {
        RollingMean::new(0);
    }
}
