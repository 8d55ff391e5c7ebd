//! Forward trade simulator.
//!
//! Opens a long trade at the close of the entry bar and walks forward at most
//! `horizon_days` closes, tracking the best and worst percentage move and the
//! day offset at which each first occurred. The trade ends at the first day
//! that satisfies the exit rule, or at the last day of the horizon.
//!
//! Outcome classification, evaluated once after the walk:
//! 1. exit price above entry → `Profit`, reported max loss forced to 0
//! 2. otherwise any positive excursion → `Profit`, max profit reduced by one point
//! 3. otherwise → `Loss`, max profit forced to 0

use crate::domain::{TradeOutcome, TradeResult};
use serde::{Deserialize, Serialize};

/// When a simulated trade leaves the market before the horizon ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitRule {
    /// Exit when `pct >= profit_target || pct <= stop_threshold`.
    ///
    /// With the default 6 / 5 thresholds the two bands cover every value, so
    /// the trade always exits on the first day after entry. Kept as the
    /// default so results line up with the historical research runs.
    #[default]
    Legacy,
    /// Exit when `pct >= profit_target || pct <= -stop_threshold`.
    Bracket,
}

impl ExitRule {
    fn should_exit(self, pct: f64, params: &TradeParams) -> bool {
        match self {
            ExitRule::Legacy => {
                pct >= params.profit_target_pct || pct <= params.stop_threshold_pct
            }
            ExitRule::Bracket => {
                pct >= params.profit_target_pct || pct <= -params.stop_threshold_pct
            }
        }
    }
}

/// Trade simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeParams {
    /// Maximum number of days held after entry.
    pub horizon_days: usize,
    /// Profit target, in percent of the entry price.
    pub profit_target_pct: f64,
    /// Stop threshold, in percent of the entry price.
    pub stop_threshold_pct: f64,
    pub exit_rule: ExitRule,
}

impl Default for TradeParams {
    fn default() -> Self {
        Self {
            horizon_days: 13,
            profit_target_pct: 6.0,
            stop_threshold_pct: 5.0,
            exit_rule: ExitRule::Legacy,
        }
    }
}

/// Simulate a trade entered at `prices[entry_index]`.
///
/// The horizon is clamped to the available data, so an entry near the end of
/// the series simply yields a shorter walk. An entry at (or past) the last
/// index has an empty horizon and always classifies as an all-zero `Loss`.
pub fn simulate(prices: &[f64], entry_index: usize, params: &TradeParams) -> TradeOutcome {
    let Some(&entry_price) = prices.get(entry_index) else {
        return TradeOutcome {
            max_profit_pct: 0.0,
            max_loss_pct: 0.0,
            time_to_max_profit_days: 0,
            time_to_max_loss_days: 0,
            result: TradeResult::Loss,
        };
    };

    let end = entry_index
        .saturating_add(1)
        .saturating_add(params.horizon_days)
        .min(prices.len());

    let mut max_profit = 0.0_f64;
    let mut max_loss = 0.0_f64;
    let mut time_to_max_profit = 0;
    let mut time_to_max_loss = 0;
    let mut exit_price = entry_price;

    for (i, &price) in prices.iter().enumerate().take(end).skip(entry_index + 1) {
        let pct = (price - entry_price) / entry_price * 100.0;

        if pct > max_profit {
            max_profit = pct;
            time_to_max_profit = i - entry_index;
        }
        if pct < max_loss {
            max_loss = pct;
            time_to_max_loss = i - entry_index;
        }

        exit_price = price;
        if params.exit_rule.should_exit(pct, params) {
            break;
        }
    }

    let result = if exit_price > entry_price {
        max_loss = 0.0;
        TradeResult::Profit
    } else if max_profit > 0.0 {
        max_profit -= 1.0;
        TradeResult::Profit
    } else {
        max_profit = 0.0;
        TradeResult::Loss
    };

    TradeOutcome {
        max_profit_pct: max_profit,
        max_loss_pct: max_loss,
        time_to_max_profit_days: time_to_max_profit,
        time_to_max_loss_days: time_to_max_loss,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    fn bracket() -> TradeParams {
        TradeParams {
            exit_rule: ExitRule::Bracket,
            ..TradeParams::default()
        }
    }

    #[test]
    fn entry_at_last_index_is_zero_loss() {
        let out = simulate(&[100.0, 101.0, 102.0], 2, &TradeParams::default());
        assert_eq!(out.max_profit_pct, 0.0);
        assert_eq!(out.max_loss_pct, 0.0);
        assert_eq!(out.time_to_max_profit_days, 0);
        assert_eq!(out.time_to_max_loss_days, 0);
        assert_eq!(out.result, TradeResult::Loss);
    }

    #[test]
    fn entry_past_end_is_zero_loss() {
        let out = simulate(&[100.0], 5, &TradeParams::default());
        assert_eq!(out.result, TradeResult::Loss);
        assert_eq!(out.max_profit_pct, 0.0);
    }

    // Legacy rule: the first day after entry always ends the trade.

    #[test]
    fn legacy_rule_exits_after_one_day_on_gain() {
        let prices = [100.0, 102.0, 120.0, 130.0];
        let out = simulate(&prices, 0, &TradeParams::default());
        assert_eq!(out.result, TradeResult::Profit);
        assert_approx(out.max_profit_pct, 2.0, 1e-9);
        assert_eq!(out.time_to_max_profit_days, 1);
        assert_eq!(out.max_loss_pct, 0.0);
    }

    #[test]
    fn legacy_rule_exits_after_one_day_on_loss() {
        let prices = [100.0, 97.0, 150.0];
        let out = simulate(&prices, 0, &TradeParams::default());
        assert_eq!(out.result, TradeResult::Loss);
        assert_approx(out.max_loss_pct, -3.0, 1e-9);
        assert_eq!(out.time_to_max_loss_days, 1);
        assert_eq!(out.max_profit_pct, 0.0);
    }

    #[test]
    fn legacy_rule_ignores_later_days() {
        // Without the one-day exit the 50% rally on day 2 would be the max profit.
        let prices = [100.0, 100.0, 150.0];
        let out = simulate(&prices, 0, &TradeParams::default());
        assert_eq!(out.result, TradeResult::Loss);
        assert_eq!(out.max_profit_pct, 0.0);
        assert_eq!(out.time_to_max_profit_days, 0);
    }

    // Bracket rule: exit only outside the ±band or at the horizon.

    #[test]
    fn bracket_rule_exits_at_profit_target() {
        let prices = [100.0, 101.0, 103.0, 107.0, 90.0];
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.result, TradeResult::Profit);
        assert_approx(out.max_profit_pct, 7.0, 1e-9);
        assert_eq!(out.time_to_max_profit_days, 3);
        assert_eq!(out.max_loss_pct, 0.0);
    }

    #[test]
    fn bracket_rule_profitable_exit_erases_drawdown() {
        let prices = [100.0, 98.0, 102.0];
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.result, TradeResult::Profit);
        assert_eq!(out.max_loss_pct, 0.0);
        // drawdown offset is still reported
        assert_eq!(out.time_to_max_loss_days, 1);
    }

    #[test]
    fn bracket_rule_stop_after_excursion_applies_haircut() {
        let prices = [100.0, 103.0, 94.0, 120.0];
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.result, TradeResult::Profit);
        assert_approx(out.max_profit_pct, 2.0, 1e-9);
        assert_approx(out.max_loss_pct, -6.0, 1e-9);
        assert_eq!(out.time_to_max_profit_days, 1);
        assert_eq!(out.time_to_max_loss_days, 2);
    }

    #[test]
    fn bracket_rule_stop_without_excursion_is_loss() {
        let prices = [100.0, 99.0, 94.0, 120.0];
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.result, TradeResult::Loss);
        assert_eq!(out.max_profit_pct, 0.0);
        assert_approx(out.max_loss_pct, -6.0, 1e-9);
    }

    #[test]
    fn horizon_is_clamped_and_bounded() {
        // 13-day horizon: the spike on day 14 is never seen.
        let mut prices = vec![100.0; 16];
        prices[14] = 200.0;
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.result, TradeResult::Loss);
        assert_eq!(out.max_profit_pct, 0.0);

        let short = simulate(&[100.0, 101.0, 102.0], 0, &bracket());
        assert_eq!(short.time_to_max_profit_days, 2);
        assert_eq!(short.result, TradeResult::Profit);
    }

    #[test]
    fn max_offset_keeps_first_occurrence() {
        let prices = [100.0, 103.0, 103.0, 101.0];
        let out = simulate(&prices, 0, &bracket());
        assert_eq!(out.time_to_max_profit_days, 1);
    }

    #[test]
    fn exit_rule_default_is_legacy() {
        assert_eq!(TradeParams::default().exit_rule, ExitRule::Legacy);
    }
}
