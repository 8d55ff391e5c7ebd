//! SpikeScan CLI: volume-spike scan, data download, and config commands.
//!
//! Commands:
//! - `scan`: scan a universe for volume spikes and simulate a trade after each
//! - `download`: fetch daily histories and store them as CSV for offline scans
//! - `config`: print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use spikescan_core::data::{
    download_symbols, load_universe, CircuitBreaker, CsvDirProvider, DataProvider, FetchWindow,
    Period, StdoutProgress, SyntheticProvider, YahooProvider,
};
use spikescan_core::ExitRule;
use spikescan_runner::export::manifest_path;
use spikescan_runner::{
    print_summary, run_scan, write_manifest, write_results_csv, RunManifest, ScanConfig,
};

#[derive(Parser)]
#[command(
    name = "spikescan",
    version,
    about = "SpikeScan: volume-spike signal scanner with forward trade simulation"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe for volume spikes and write the results CSV.
    Scan {
        /// Universe CSV with `Symbol` and `Market cap` columns.
        #[arg(long, default_value = "stock_list.csv")]
        universe: PathBuf,

        /// Output CSV path. A `.manifest.json` is written next to it.
        #[arg(long, short, default_value = "results.csv")]
        output: PathBuf,

        /// Worker threads (0 = one per core).
        #[arg(long)]
        threads: Option<usize>,

        /// Exit rule for simulated trades.
        #[arg(long, value_enum)]
        exit_rule: Option<ExitRuleArg>,

        /// Extra fetch attempts after a transient failure.
        #[arg(long)]
        retries: Option<u32>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Download daily histories to `<out-dir>/<SYMBOL>.csv`.
    Download {
        /// Symbols to download. Read from --universe when omitted.
        symbols: Vec<String>,

        /// Universe CSV to take symbols from.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Directory for the CSV files.
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Config file to load; defaults are printed without one.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Options shared by commands that fetch data.
#[derive(Args)]
struct SourceArgs {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data provider.
    #[arg(long, value_enum, default_value_t = ProviderKind::Yahoo)]
    provider: ProviderKind,

    /// Directory of `<SYMBOL>.csv` files for `--provider csv`.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Trailing period: 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, max.
    #[arg(long)]
    period: Option<Period>,

    /// Start date (YYYY-MM-DD); requires --end.
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD); requires --start.
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Exchange suffix appended to symbols for Yahoo (e.g. ".NS", ".BO", "").
    #[arg(long)]
    suffix: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExitRuleArg {
    Legacy,
    Bracket,
}

impl From<ExitRuleArg> for ExitRule {
    fn from(arg: ExitRuleArg) -> Self {
        match arg {
            ExitRuleArg::Legacy => ExitRule::Legacy,
            ExitRuleArg::Bracket => ExitRule::Bracket,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan {
            universe,
            output,
            threads,
            exit_rule,
            retries,
            source,
        } => run_scan_cmd(&universe, &output, threads, exit_rule, retries, &source),
        Commands::Download {
            symbols,
            universe,
            out_dir,
            source,
        } => run_download(symbols, universe.as_deref(), &out_dir, &source),
        Commands::Config { config } => run_config(config.as_deref()),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file (or defaults) and apply the data overrides.
fn load_config(source: &SourceArgs) -> Result<ScanConfig> {
    let mut config = match &source.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    if let Some(period) = source.period {
        config.data.period = period;
        config.data.start = None;
        config.data.end = None;
    }
    if source.start.is_some() {
        config.data.start = source.start;
        config.data.end = source.end;
    }
    if let Some(suffix) = &source.suffix {
        config.data.symbol_suffix = suffix.clone();
    }
    Ok(config)
}

fn build_provider(source: &SourceArgs, config: &ScanConfig) -> Result<Box<dyn DataProvider>> {
    let provider: Box<dyn DataProvider> = match source.provider {
        ProviderKind::Yahoo => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(
                YahooProvider::new(circuit_breaker)?.with_suffix(config.data.symbol_suffix.clone()),
            )
        }
        ProviderKind::Csv => {
            let provider = CsvDirProvider::new(&source.data_dir);
            if !provider.is_available() {
                bail!("data directory {} does not exist", provider.dir().display());
            }
            Box::new(provider)
        }
        ProviderKind::Synthetic => {
            let anchor = match config.data.window() {
                FetchWindow::Range { end, .. } => end,
                FetchWindow::Period(_) => chrono::Local::now().date_naive(),
            };
            Box::new(SyntheticProvider::new(anchor))
        }
    };
    Ok(provider)
}

fn run_scan_cmd(
    universe_path: &Path,
    output: &Path,
    threads: Option<usize>,
    exit_rule: Option<ExitRuleArg>,
    retries: Option<u32>,
    source: &SourceArgs,
) -> Result<()> {
    let mut config = load_config(source)?;
    if let Some(threads) = threads {
        config.run.threads = threads;
    }
    if let Some(rule) = exit_rule {
        config.trade.exit_rule = rule.into();
    }
    if let Some(retries) = retries {
        config.data.retries = retries;
    }
    config.validate()?;

    let universe = load_universe(universe_path)
        .with_context(|| format!("failed to load universe {}", universe_path.display()))?;
    info!(symbols = universe.len(), path = %universe_path.display(), "universe loaded");

    let provider = build_provider(source, &config)?;
    let report = run_scan(&universe, provider.as_ref(), &config)?;

    print_summary(&report);

    write_results_csv(output, &report.records)?;
    let manifest = manifest_path(output);
    write_manifest(&manifest, &RunManifest::new(&report, &config))?;
    println!("\nResults saved to: {}", output.display());
    println!("Manifest saved to: {}", manifest.display());

    if report.symbols_scanned == 0 && !report.failures.is_empty() {
        bail!("no symbol could be fetched ({} failures)", report.failures.len());
    }
    Ok(())
}

fn run_download(
    symbols: Vec<String>,
    universe: Option<&Path>,
    out_dir: &Path,
    source: &SourceArgs,
) -> Result<()> {
    let config = load_config(source)?;
    config.validate()?;

    let symbols = match (symbols.is_empty(), universe) {
        (false, _) => symbols,
        (true, Some(path)) => load_universe(path)
            .with_context(|| format!("failed to load universe {}", path.display()))?
            .into_iter()
            .map(|e| e.symbol)
            .collect(),
        (true, None) => bail!("give symbols or --universe"),
    };

    let provider = build_provider(source, &config)?;
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
    let summary = download_symbols(
        provider.as_ref(),
        out_dir,
        &sym_refs,
        &config.data.window(),
        &StdoutProgress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        bail!("{} of {} downloads failed", summary.failed, summary.total);
    }
    Ok(())
}

fn run_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    print!("{}", config.to_toml()?);
    Ok(())
}
