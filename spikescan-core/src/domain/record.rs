//! Signal, trade outcome, and the flattened result record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeResult {
    Profit,
    Loss,
}

impl TradeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeResult::Profit => "Profit",
            TradeResult::Loss => "Loss",
        }
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of simulating one trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub max_profit_pct: f64,
    pub max_loss_pct: f64,
    pub time_to_max_profit_days: usize,
    pub time_to_max_loss_days: usize,
    pub result: TradeResult,
}

/// A bar that satisfied the volume-spike + up-close trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    /// Index of the trigger bar in its history.
    pub index: usize,
    pub date: NaiveDate,
    /// RSI at the trigger bar; `NaN` when the RSI window is not yet full.
    pub rsi: f64,
    pub volume_multiple: f64,
}

/// One output row: a signal, its simulated outcome, and the symbol's market cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub rsi: f64,
    pub volume_multiple: f64,
    pub market_cap: f64,
    pub max_profit_pct: f64,
    pub max_loss_pct: f64,
    pub time_to_max_profit_days: usize,
    pub time_to_max_loss_days: usize,
    pub result: TradeResult,
}

impl ResultRecord {
    pub fn new(signal: Signal, market_cap: f64, outcome: TradeOutcome) -> Self {
        Self {
            symbol: signal.symbol,
            date: signal.date,
            rsi: signal.rsi,
            volume_multiple: signal.volume_multiple,
            market_cap,
            max_profit_pct: outcome.max_profit_pct,
            max_loss_pct: outcome.max_loss_pct,
            time_to_max_profit_days: outcome.time_to_max_profit_days,
            time_to_max_loss_days: outcome.time_to_max_loss_days,
            result: outcome.result,
        }
    }
}
