//! Console report: records table, hit-rate line per result class, failures.

use spikescan_core::{ResultRecord, TradeResult};

use crate::runner::ScanReport;

/// Aggregate statistics over a set of records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub records: usize,
    pub profits: usize,
    pub losses: usize,
    pub avg_max_profit_pct: f64,
    pub avg_max_loss_pct: f64,
}

impl SummaryStats {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let n = records.len();
        let profits = records
            .iter()
            .filter(|r| r.result == TradeResult::Profit)
            .count();
        let mean = |f: fn(&ResultRecord) -> f64| {
            if n == 0 {
                0.0
            } else {
                records.iter().map(f).sum::<f64>() / n as f64
            }
        };
        Self {
            records: n,
            profits,
            losses: n - profits,
            avg_max_profit_pct: mean(|r: &ResultRecord| r.max_profit_pct),
            avg_max_loss_pct: mean(|r: &ResultRecord| r.max_loss_pct),
        }
    }

    /// Share of records in `result`, in percent. 0 when there are no records.
    pub fn hit_rate(&self, result: TradeResult) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        let count = match result {
            TradeResult::Profit => self.profits,
            TradeResult::Loss => self.losses,
        };
        count as f64 / self.records as f64 * 100.0
    }
}

fn fmt_opt(v: f64, precision: usize) -> String {
    if v.is_nan() {
        "-".into()
    } else {
        format!("{v:.precision$}")
    }
}

/// Render the report as plain text.
pub fn format_summary(report: &ScanReport) -> String {
    let stats = SummaryStats::from_records(&report.records);
    let mut out = format!(
        "Run {} ({}, window {})\n\
         Symbols: {} total, {} scanned, {} with signals, {} failed\n\n",
        &report.run_id[..report.run_id.len().min(12)],
        report.provider,
        report.window,
        report.symbols_total,
        report.symbols_scanned,
        report.symbols_with_signals(),
        report.failures.len(),
    );

    if report.records.is_empty() {
        out.push_str("No signals found.\n");
    } else {
        out.push_str(&format!(
            "{:<14} {:<10} {:>6} {:>8} {:>16} {:>9} {:>9} {:>5} {:>5}  {}\n",
            "Symbol", "Date", "RSI", "VolMult", "Market cap", "MaxProf%", "MaxLoss%", "TtP", "TtL",
            "Result"
        ));
        for r in &report.records {
            out.push_str(&format!(
                "{:<14} {:<10} {:>6} {:>8.2} {:>16} {:>9.2} {:>9.2} {:>5} {:>5}  {}\n",
                r.symbol,
                r.date,
                fmt_opt(r.rsi, 1),
                r.volume_multiple,
                fmt_opt(r.market_cap, 0),
                r.max_profit_pct,
                r.max_loss_pct,
                r.time_to_max_profit_days,
                r.time_to_max_loss_days,
                r.result,
            ));
        }
        out.push('\n');
        for result in [TradeResult::Profit, TradeResult::Loss] {
            out.push_str(&format!(
                "{:<6} {:>5.1}%\n",
                result.as_str(),
                stats.hit_rate(result)
            ));
        }
        out.push_str(&format!(
            "Avg max profit {:+.2}%, avg max loss {:+.2}% over {} trades\n",
            stats.avg_max_profit_pct, stats.avg_max_loss_pct, stats.records
        ));
    }

    if !report.failures.is_empty() {
        out.push_str("\nFailed symbols:\n");
        for f in &report.failures {
            out.push_str(&format!("  {:<14} {} (attempts: {})\n", f.symbol, f.reason, f.attempts));
        }
    }

    out
}

/// Print the report to stdout.
pub fn print_summary(report: &ScanReport) {
    print!("{}", format_summary(report));
}
