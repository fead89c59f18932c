//! # Tapescan Core
//!
//! Rate-limited market scan pipeline: universe listing, per-ticker
//! price and history lookups, trend classification, and a ranked
//! result set.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | API client for the three market-data queries |
//! | [`config`] | Scan configuration and credential validation |
//! | [`domain`] | Domain models (Ticker, PriceSnapshot, StockRecord) |
//! | [`error`] | Closed scan error taxonomy |
//! | [`filter`] | Post-scan filtering and sorting |
//! | [`http`] | HTTP transport abstraction |
//! | [`retry`] | Bounded exponential-backoff retry |
//! | [`scan`] | Batch orchestrator, progress, cancellation |
//! | [`scheduler`] | FIFO, paced request scheduler |
//! | [`trend`] | Trend classification |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌──────────────────┐
//! │   Scanner    │─────▶│ MarketDataClient │
//! │ (batches,    │      └────────┬─────────┘
//! │  settle-all) │               │
//! └──────┬───────┘               ▼
//!        │              ┌──────────────────┐     ┌─────────────┐
//!        ▼              │ RequestScheduler │────▶│ HttpClient  │
//! ┌──────────────┐      │ (FIFO, paced)    │     │ (reqwest)   │
//! │ classify()   │      └──────────────────┘     └─────────────┘
//! │ RecordFilter │
//! └──────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tapescan_core::{
//!     MarketDataClient, ReqwestHttpClient, RequestScheduler, ScanConfig, Scanner, Timeframe,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::from_env()?;
//!     let scheduler =
//!         RequestScheduler::new(Arc::new(ReqwestHttpClient::new()), config.rate_budget);
//!     let client = MarketDataClient::new(scheduler, &config);
//!     let scanner = Scanner::new(client, config);
//!
//!     let records = scanner.scan(Timeframe::Daily).await?;
//!     for record in &records {
//!         println!("{} {:+.2}%", record.symbol, record.change_percent);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure policy
//!
//! The universe listing is scan-critical: it is retried with
//! exponential backoff and any remaining failure surfaces as a typed
//! [`ScanError`]. Per-ticker lookups are scan-tolerant: they are never
//! retried, and their failures are logged and folded into "no record
//! for this ticker" without aborting the batch or the scan.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod http;
pub mod retry;
pub mod scan;
pub mod scheduler;
pub mod trend;

// Re-export commonly used types at the crate root.

pub use client::MarketDataClient;
pub use config::{ScanConfig, TimeframeWindows, API_KEY_ENV, DEFAULT_BASE_URL};
pub use domain::{
    HistoricalBar, PriceSnapshot, StockRecord, Symbol, Ticker, Timeframe, Trend, TrendDirection,
    TrendResult,
};
pub use error::{ScanError, ValidationError};
pub use filter::{sort_records, RecordFilter, SortDirection, SortKey};
pub use http::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use retry::{with_retry, Backoff, RetryPolicy};
pub use scan::{
    rank_by_move_magnitude, CancelToken, ProgressSnapshot, ScanProgress, Scanner, SkipReason,
    TickerOutcome,
};
pub use scheduler::{RateBudget, RequestScheduler};
pub use trend::{classify, TrendThresholds};
