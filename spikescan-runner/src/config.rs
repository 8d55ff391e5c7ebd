//! Serializable scan configuration.
//!
//! Loaded from TOML; every section and field is optional and falls back to
//! the research defaults. CLI flags override values after loading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spikescan_core::data::{FetchWindow, Period};
use spikescan_core::{IndicatorParams, ScanParams, SignalParams, TradeParams};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a scan run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level scan configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub data: DataConfig,
    pub indicators: IndicatorParams,
    pub signal: SignalParams,
    pub trade: TradeParams,
    pub run: RunSettings,
}

/// Which history to request for each symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Trailing window; ignored when both `start` and `end` are set.
    pub period: Period,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Exchange suffix appended to universe symbols for Yahoo requests.
    pub symbol_suffix: String,
    /// Extra fetch attempts per symbol after a transient failure.
    pub retries: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            period: Period::OneMonth,
            start: None,
            end: None,
            symbol_suffix: ".NS".into(),
            retries: 0,
        }
    }
}

impl DataConfig {
    pub fn window(&self) -> FetchWindow {
        match (self.start, self.end) {
            (Some(start), Some(end)) => FetchWindow::Range { start, end },
            _ => FetchWindow::Period(self.period),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Worker threads for the per-symbol fan-out; 0 uses rayon's default.
    pub threads: usize,
}

impl ScanConfig {
    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a TOML string and validate it.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML (used by `spikescan config`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let positive = |v: f64| v > 0.0;

        if self.indicators.rsi_window == 0 {
            return invalid("indicators.rsi_window must be at least 1".into());
        }
        if self.indicators.volume_window == 0 {
            return invalid("indicators.volume_window must be at least 1".into());
        }
        if self.signal.first_index < self.indicators.volume_window {
            return invalid(format!(
                "signal.first_index ({}) must be >= indicators.volume_window ({})",
                self.signal.first_index, self.indicators.volume_window
            ));
        }
        if !positive(self.signal.volume_threshold) {
            return invalid(format!(
                "signal.volume_threshold must be positive, got {}",
                self.signal.volume_threshold
            ));
        }
        if self.trade.horizon_days == 0 {
            return invalid("trade.horizon_days must be at least 1".into());
        }
        if !positive(self.trade.profit_target_pct) {
            return invalid(format!(
                "trade.profit_target_pct must be positive, got {}",
                self.trade.profit_target_pct
            ));
        }
        if !positive(self.trade.stop_threshold_pct) {
            return invalid(format!(
                "trade.stop_threshold_pct must be positive, got {}",
                self.trade.stop_threshold_pct
            ));
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start > end {
                return invalid(format!("data.start ({start}) is after data.end ({end})"));
            }
        }
        Ok(())
    }

    /// Parameters handed to the core scanner.
    pub fn scan_params(&self) -> ScanParams {
        ScanParams {
            indicators: self.indicators,
            signal: self.signal,
            trade: self.trade,
        }
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical data, indicator, signal and trade settings share
    /// a run id whatever their thread count; the manifest records it
    /// so result files can be matched to the parameters that produced them.
    pub fn run_id(&self) -> RunId {
        // Execution settings do not change results and are left out.
        let identity = RunIdentity {
            data: &self.data,
            indicators: &self.indicators,
            signal: &self.signal,
            trade: &self.trade,
        };
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_string(&identity).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// The result-affecting part of a `ScanConfig`.
#[derive(Serialize)]
struct RunIdentity<'a> {
    data: &'a DataConfig,
    indicators: &'a IndicatorParams,
    signal: &'a SignalParams,
    trade: &'a TradeParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikescan_core::ExitRule;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ScanConfig::from_toml("").unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.indicators.rsi_window, 14);
        assert_eq!(config.indicators.volume_window, 9);
        assert_eq!(config.signal.first_index, 10);
        assert_eq!(config.signal.volume_threshold, 4.0);
        assert_eq!(config.trade.horizon_days, 13);
        assert_eq!(config.trade.exit_rule, ExitRule::Legacy);
        assert_eq!(config.data.period, Period::OneMonth);
        assert_eq!(config.data.symbol_suffix, ".NS");
        assert_eq!(config.data.retries, 0);
    }

    #[test]
    fn parses_partial_sections() {
        let toml = r#"
[data]
period = "6mo"
retries = 2

[trade]
exit_rule = "bracket"
profit_target_pct = 8.0

[run]
threads = 4
"#;
        let config = ScanConfig::from_toml(toml).unwrap();
        assert_eq!(config.data.period, Period::SixMonths);
        assert_eq!(config.data.retries, 2);
        assert_eq!(config.trade.exit_rule, ExitRule::Bracket);
        assert_eq!(config.trade.profit_target_pct, 8.0);
        assert_eq!(config.trade.stop_threshold_pct, 5.0);
        assert_eq!(config.run.threads, 4);
    }

    #[test]
    fn explicit_range_overrides_period() {
        let toml = r#"
[data]
start = "2024-01-01"
end = "2024-06-30"
"#;
        let config = ScanConfig::from_toml(toml).unwrap();
        assert!(matches!(config.data.window(), FetchWindow::Range { .. }));
        assert_eq!(
            ScanConfig::default().data.window(),
            FetchWindow::Period(Period::OneMonth)
        );
    }

    #[test]
    fn rejects_invalid_values() {
        for toml in [
            "[indicators]\nrsi_window = 0",
            "[indicators]\nvolume_window = 20",
            "[signal]\nvolume_threshold = 0.0",
            "[trade]\nhorizon_days = 0",
            "[trade]\nstop_threshold_pct = -1.0",
            "[data]\nstart = \"2024-06-01\"\nend = \"2024-01-01\"",
        ] {
            let err = ScanConfig::from_toml(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{toml}: {err}");
        }
    }

    #[test]
    fn rejects_unknown_period() {
        let err = ScanConfig::from_toml("[data]\nperiod = \"3w\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ScanConfig::default();
        let rendered = config.to_toml().unwrap();
        assert_eq!(ScanConfig::from_toml(&rendered).unwrap(), config);
    }

    #[test]
    fn run_id_is_deterministic_and_sensitive() {
        let a = ScanConfig::default();
        let mut b = ScanConfig::default();
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);
        b.signal.volume_threshold = 5.0;
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn run_id_ignores_thread_count() {
        let a = ScanConfig::default();
        let mut b = ScanConfig::default();
        b.run.threads = 8;
        assert_eq!(a.run_id(), b.run_id());
    }
}
