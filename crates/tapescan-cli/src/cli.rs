//! CLI argument definitions for tapescan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run a full scan and print the ranked movers |
//! | `check` | Validate the configured credential without scanning |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |

use clap::{Args, Parser, Subcommand, ValueEnum};
use tapescan_core::{SortDirection, SortKey, Timeframe};

/// Tapescan - rate-limited market scanner
///
/// Scans an exchange's universe through the upstream market-data API,
/// filters to a price/volume band, classifies short-term trends and
/// prints the strongest movers first.
#[derive(Debug, Parser)]
#[command(
    name = "tapescan",
    author,
    version,
    about = "Rate-limited market scanner",
    long_about = "Tapescan scans an exchange's ticker universe through a rate-limited \
market-data API, keeps instruments inside a price/volume band, classifies each by \
short-term trend, and prints the strongest movers first.\n\
\n\
The API credential is read from TAPESCAN_API_KEY."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table for terminal display.
    Table,
    /// Single JSON array.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full scan.
    ///
    /// # Examples
    ///
    ///   tapescan scan
    ///   tapescan scan --timeframe weekly --max-price 3.50
    ///   tapescan scan --query bio --sort volume --direction desc
    Scan(ScanArgs),

    /// Validate the configured API credential without issuing any
    /// network calls.
    Check,
}

/// Arguments for the `scan` command.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Lookback timeframe for trend classification.
    #[arg(long, value_enum, default_value_t = TimeframeArg::Daily)]
    pub timeframe: TimeframeArg,

    /// Price ceiling; tickers above it are excluded during the scan.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Average-volume floor applied to scan survivors.
    #[arg(long)]
    pub min_volume: Option<u64>,

    /// Exchange tag for the universe listing (e.g. XNAS).
    #[arg(long)]
    pub exchange: Option<String>,

    /// Per-batch fan-out bound.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Post-scan price floor filter.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Post-scan sector filter; repeat for multiple sectors.
    #[arg(long = "sector")]
    pub sectors: Vec<String>,

    /// Case-insensitive substring match on symbol or name.
    #[arg(long)]
    pub query: Option<String>,

    /// Sort key for the result table.
    #[arg(long, value_enum, default_value_t = SortKeyArg::ChangePercent)]
    pub sort: SortKeyArg,

    /// Sort direction.
    #[arg(long, value_enum, default_value_t = SortDirectionArg::Descending)]
    pub direction: SortDirectionArg,
}

/// Scan timeframe selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeframeArg {
    Daily,
    #[value(name = "3day", alias = "three-day")]
    ThreeDay,
    Weekly,
}

impl From<TimeframeArg> for Timeframe {
    fn from(value: TimeframeArg) -> Self {
        match value {
            TimeframeArg::Daily => Timeframe::Daily,
            TimeframeArg::ThreeDay => Timeframe::ThreeDay,
            TimeframeArg::Weekly => Timeframe::Weekly,
        }
    }
}

/// Sort key selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKeyArg {
    Symbol,
    Price,
    ChangePercent,
    Volume,
    MarketCap,
}

impl From<SortKeyArg> for SortKey {
    fn from(value: SortKeyArg) -> Self {
        match value {
            SortKeyArg::Symbol => SortKey::Symbol,
            SortKeyArg::Price => SortKey::Price,
            SortKeyArg::ChangePercent => SortKey::ChangePercent,
            SortKeyArg::Volume => SortKey::Volume,
            SortKeyArg::MarketCap => SortKey::MarketCap,
        }
    }
}

/// Sort direction selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDirectionArg {
    #[value(alias = "asc")]
    Ascending,
    #[value(alias = "desc")]
    Descending,
}

impl From<SortDirectionArg> for SortDirection {
    fn from(value: SortDirectionArg) -> Self {
        match value {
            SortDirectionArg::Ascending => SortDirection::Ascending,
            SortDirectionArg::Descending => SortDirection::Descending,
        }
    }
}
