//! Integration tests for the scan pipeline: provider → runner → export.

use chrono::{Duration, NaiveDate};
use spikescan_core::data::{
    parse_universe, DataError, DataProvider, DataSource, FetchResult, FetchWindow,
};
use spikescan_core::{PriceBar, TradeResult};
use spikescan_runner::export::{manifest_path, read_manifest, RunManifest};
use spikescan_runner::{run_scan, write_manifest, write_results_csv, ScanConfig};
use std::collections::HashMap;
use std::thread;

/// Serves canned histories; unknown symbols fail with `SymbolNotFound`.
struct MockProvider {
    histories: HashMap<String, Vec<PriceBar>>,
}

impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, symbol: &str, _window: &FetchWindow) -> Result<FetchResult, DataError> {
        // scramble completion order across workers
        let delay = symbol.bytes().map(u64::from).sum::<u64>() % 7;
        thread::sleep(std::time::Duration::from_millis(delay));
        let mut bars = self
            .histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        // providers may return newest-first
        bars.reverse();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Rising closes, flat volume, with a 5x spike on `spike_day`.
fn spike_history(spike_day: Option<usize>) -> Vec<PriceBar> {
    let base = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    (0..20)
        .map(|i| {
            let close = 100.0 + i as f64;
            PriceBar {
                date: base + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: if Some(i) == spike_day { 5000 } else { 1000 },
            }
        })
        .collect()
}

fn provider() -> MockProvider {
    let mut histories = HashMap::new();
    histories.insert("AAA".to_string(), spike_history(Some(15)));
    histories.insert("BBB".to_string(), spike_history(None));
    histories.insert("CCC".to_string(), spike_history(Some(12)));
    histories.insert("DDD".to_string(), spike_history(Some(18)));
    MockProvider { histories }
}

const UNIVERSE: &str = "\
Name,Symbol,Market cap
Delta,DDD,400
Alpha,AAA,\"1,000\"
Missing,ZZZ,5
Bravo,BBB,200
Charlie,CCC,
";

fn config(threads: usize) -> ScanConfig {
    let mut config = ScanConfig::default();
    config.run.threads = threads;
    config
}

#[test]
fn failures_are_skipped_and_order_is_kept() {
    let universe = parse_universe(UNIVERSE.as_bytes()).unwrap();
    let report = run_scan(&universe, &provider(), &config(4)).unwrap();

    assert_eq!(report.symbols_total, 5);
    assert_eq!(report.symbols_scanned, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol, "ZZZ");
    assert_eq!(report.failures[0].attempts, 1);

    let symbols: Vec<&str> = report.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, ["DDD", "AAA", "CCC"]);
    assert_eq!(report.symbols_with_signals(), 3);

    let aaa = &report.records[1];
    assert_eq!(aaa.market_cap, 1000.0);
    assert_eq!(aaa.volume_multiple, 5.0);
    assert_eq!(aaa.result, TradeResult::Profit);
    assert!(report.records[2].market_cap.is_nan());
}

#[test]
fn thread_count_does_not_change_results() {
    let universe = parse_universe(UNIVERSE.as_bytes()).unwrap();
    let serial = run_scan(&universe, &provider(), &config(1)).unwrap();
    let parallel = run_scan(&universe, &provider(), &config(8)).unwrap();
    assert_eq!(serial.records.len(), parallel.records.len());
    for (a, b) in serial.records.iter().zip(&parallel.records) {
        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.date, b.date);
        assert_eq!(a.result, b.result);
    }
}

#[test]
fn run_id_is_independent_of_thread_count() {
    assert_eq!(config(1).run_id(), config(8).run_id());
    let mut other = config(1);
    other.signal.volume_threshold = 3.0;
    assert_ne!(config(1).run_id(), other.run_id());
}

#[test]
fn results_and_manifest_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let universe = parse_universe(UNIVERSE.as_bytes()).unwrap();
    let config = config(2);
    let report = run_scan(&universe, &provider(), &config).unwrap();

    let results = dir.path().join("out").join("results.csv");
    write_results_csv(&results, &report.records).unwrap();

    let mut rdr = csv::Reader::from_path(&results).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "Stock Name");
    assert_eq!(&headers[9], "Trade Result");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][0], "AAA");
    assert_eq!(&rows[1][1], "2024-08-16");
    assert_eq!(&rows[1][2], "100");
    assert_eq!(&rows[1][3], "5");
    // CCC has no market cap; its spike on bar 12 has no RSI yet
    assert_eq!(&rows[2][2], "");
    assert_eq!(&rows[2][4], "");

    let manifest_file = manifest_path(&results);
    write_manifest(&manifest_file, &RunManifest::new(&report, &config)).unwrap();
    let manifest = read_manifest(&manifest_file).unwrap();
    assert_eq!(manifest.run_id, config.run_id());
    assert_eq!(manifest.record_count, 3);
    assert_eq!(manifest.symbols_with_signals, 3);
    assert_eq!(manifest.failures.len(), 1);
    assert_eq!(manifest.config, config);
    assert_eq!(manifest.provider, "mock");
}
