//! Market data: provider trait, providers, universe loading, downloads.

pub mod circuit_breaker;
pub mod csv_dir;
pub mod download;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use download::{download_symbols, DownloadSummary};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, FetchWindow, Period,
    StdoutProgress,
};
pub use synthetic::SyntheticProvider;
pub use universe::{load_universe, parse_universe, UniverseEntry, UniverseError};
pub use yahoo::YahooProvider;
