//! SpikeScan Core: price history, indicators, signal scanner, trade simulator.
//!
//! This crate contains the detection and scoring engine:
//! - Domain types (bars, price histories, signals, trade outcomes, result records)
//! - Indicators (simple-mean RSI, trailing average volume) on an O(1) rolling accumulator
//! - Trade simulator with a bounded horizon and configurable exit rule
//! - Volume-spike scanner that simulates a trade after every trigger
//! - Data providers (Yahoo Finance, CSV directory, synthetic) and the universe loader
//!
//! Everything below `data` is pure and synchronous; providers do the blocking I/O.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod scanner;
pub mod simulator;

pub use domain::{PriceBar, PriceHistory, ResultRecord, Signal, TradeOutcome, TradeResult};
pub use indicators::IndicatorParams;
pub use scanner::{scan, ScanParams, SignalParams};
pub use simulator::{simulate, ExitRule, TradeParams};
