//! SpikeScan Runner: scan orchestration, configuration, export, reporting.
//!
//! This crate builds on `spikescan-core` to provide:
//! - TOML scan configuration with defaults, validation and a run id
//! - Per-symbol fan-out over a bounded rayon pool with skip-on-failure
//! - Results CSV and JSON run manifest
//! - Plain-text console summary

pub mod config;
pub mod export;
pub mod report;
pub mod runner;

pub use config::{ConfigError, DataConfig, RunId, RunSettings, ScanConfig};
pub use export::{write_manifest, write_results_csv, RunManifest};
pub use report::{format_summary, print_summary, SummaryStats};
pub use runner::{run_scan, RunError, ScanReport, SymbolFailure};
