//! Batched scan orchestration.
//!
//! The scanner partitions the universe into fixed-size batches, runs
//! per-ticker fetch+classify concurrently within a batch, pauses
//! between batches, and accumulates surviving records while tolerating
//! individual failures. The universe listing is the only scan-critical
//! call; everything per-ticker degrades to "no record" and is logged,
//! never raised.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::MarketDataClient;
use crate::config::ScanConfig;
use crate::domain::{StockRecord, Ticker, Timeframe, Trend};
use crate::error::ScanError;
use crate::retry::with_retry;
use crate::trend::{classify, TrendThresholds};

/// Why a ticker produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No price snapshot for today (unknown symbol or no session yet).
    PriceUnavailable,
    /// Snapshot price above the configured ceiling.
    AboveCeiling,
    /// No historical bars in the lookback window.
    NoHistory,
    /// No meaningful movement over the window.
    NeutralTrend,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceUnavailable => "price_unavailable",
            Self::AboveCeiling => "above_ceiling",
            Self::NoHistory => "no_history",
            Self::NeutralTrend => "neutral_trend",
        }
    }
}

/// Explicit per-ticker outcome collected by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Record(StockRecord),
    Skipped(SkipReason),
    Failed(ScanError),
}

/// Live scan counters, mutated only by the orchestrator and readable
/// by observers through [`ScanProgress::snapshot`].
#[derive(Debug, Default)]
pub struct ScanProgress {
    current: AtomicUsize,
    total: AtomicUsize,
    status: Mutex<String>,
}

impl ScanProgress {
    fn begin(&self, total: usize, status: impl Into<String>) {
        self.current.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        self.set_status(status.into());
    }

    fn record_item(&self) {
        let current = self.current.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        self.set_status(format!("scanned {current} of {total} tickers"));
    }

    fn finish(&self, survivors: usize) {
        self.set_status(format!("scan complete: {survivors} candidates"));
    }

    fn set_status(&self, status: String) {
        let mut guard = self
            .status
            .lock()
            .expect("scan progress status lock is not poisoned");
        *guard = status;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let status = self
            .status
            .lock()
            .expect("scan progress status lock is not poisoned")
            .clone();
        ProgressSnapshot {
            current: self.current.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            status,
        }
    }
}

/// Point-in-time copy of the scan progress counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub current: usize,
    pub total: usize,
    pub status: String,
}

/// Scan-scoped cancellation signal, observed at each orchestrator
/// await point. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-ticker evaluation parameters, cloned into each spawned task.
#[derive(Debug, Clone)]
struct ScanRules {
    max_price: f64,
    window_days: u32,
    thresholds: TrendThresholds,
    default_sector: String,
}

/// The batch orchestrator.
pub struct Scanner {
    client: MarketDataClient,
    config: ScanConfig,
    progress: Arc<ScanProgress>,
    cancel: CancelToken,
}

impl Scanner {
    pub fn new(client: MarketDataClient, config: ScanConfig) -> Self {
        Self {
            client,
            config,
            progress: Arc::new(ScanProgress::default()),
            cancel: CancelToken::new(),
        }
    }

    /// Live progress handle, readable while a scan runs.
    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Handle that aborts the current scan when fired.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one complete scan over the configured exchange.
    ///
    /// Either returns the ranked record set (possibly empty) or exactly
    /// one fatal [`ScanError`]; per-ticker failures never surface here.
    pub async fn scan(&self, timeframe: Timeframe) -> Result<Vec<StockRecord>, ScanError> {
        self.config.validate_credential()?;
        self.ensure_active()?;

        self.progress.begin(0, "listing universe");
        let client = &self.client;
        let universe = with_retry(&self.config.retry, || client.list_universe()).await?;
        if universe.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        info!(
            tickers = universe.len(),
            timeframe = timeframe.as_str(),
            "universe listed"
        );

        let rules = ScanRules {
            max_price: self.config.max_price,
            window_days: self.config.windows.days_for(timeframe),
            thresholds: self.config.thresholds,
            default_sector: self.config.exchange.clone(),
        };

        self.progress
            .begin(universe.len(), format!("scanning {} tickers", universe.len()));

        let batch_size = self.config.batch_size.max(1);
        let batches: Vec<Vec<Ticker>> = universe
            .chunks(batch_size)
            .map(<[Ticker]>::to_vec)
            .collect();
        let batch_count = batches.len();
        let mut candidates = Vec::new();

        for (index, batch) in batches.into_iter().enumerate() {
            self.ensure_active()?;
            debug!(batch = index + 1, batches = batch_count, size = batch.len(), "starting batch");

            let mut tasks = Vec::with_capacity(batch.len());
            for ticker in batch {
                let client = self.client.clone();
                let rules = rules.clone();
                tasks.push(tokio::spawn(evaluate_ticker(client, rules, ticker)));
            }

            // Settle-all: one ticker's failure never cancels siblings.
            let outcomes = futures::future::join_all(tasks).await;
            for outcome in outcomes {
                match outcome {
                    Ok(TickerOutcome::Record(record)) => {
                        debug!(symbol = %record.symbol, change = record.change_percent, "candidate found");
                        candidates.push(record);
                    }
                    Ok(TickerOutcome::Skipped(reason)) => {
                        debug!(reason = reason.as_str(), "ticker skipped");
                    }
                    Ok(TickerOutcome::Failed(error)) => {
                        warn!(code = error.code(), error = %error, "ticker lookup failed");
                    }
                    Err(error) => {
                        warn!(error = %error, "ticker task aborted");
                    }
                }
                self.progress.record_item();
            }

            if index + 1 < batch_count {
                self.ensure_active()?;
                tokio::time::sleep(self.config.inter_batch_delay).await;
            }
        }

        candidates.retain(|record| record.avg_volume >= self.config.min_volume);
        rank_by_move_magnitude(&mut candidates);

        self.progress.finish(candidates.len());
        info!(candidates = candidates.len(), "scan complete");
        Ok(candidates)
    }

    fn ensure_active(&self) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }
}

/// Rank strongest movers first: descending by absolute percent change,
/// stable for ties.
pub fn rank_by_move_magnitude(records: &mut [StockRecord]) {
    records.sort_by(|a, b| {
        b.change_percent
            .abs()
            .total_cmp(&a.change_percent.abs())
    });
}

/// Fetch, classify and assemble one ticker. Never panics the batch:
/// every failure is folded into the returned outcome.
async fn evaluate_ticker(
    client: MarketDataClient,
    rules: ScanRules,
    ticker: Ticker,
) -> TickerOutcome {
    let snapshot = match client.current_price(&ticker.symbol).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return TickerOutcome::Skipped(SkipReason::PriceUnavailable),
        Err(error) => return TickerOutcome::Failed(error),
    };

    if snapshot.close > rules.max_price {
        return TickerOutcome::Skipped(SkipReason::AboveCeiling);
    }

    let bars = match client.historical_bars(&ticker.symbol, rules.window_days).await {
        Ok(bars) => bars,
        Err(error) => return TickerOutcome::Failed(error),
    };
    if bars.is_empty() {
        return TickerOutcome::Skipped(SkipReason::NoHistory);
    }

    let trend = classify(&bars, &rules.thresholds);
    if trend.trend == Trend::Neutral {
        return TickerOutcome::Skipped(SkipReason::NeutralTrend);
    }

    let price = if trend.last_close > 0.0 {
        trend.last_close
    } else {
        snapshot.close
    };
    let avg_volume = if trend.avg_volume > 0 {
        trend.avg_volume
    } else {
        snapshot.volume
    };

    TickerOutcome::Record(StockRecord {
        market_cap: ticker.estimated_market_cap(price),
        sector: ticker
            .exchange
            .clone()
            .unwrap_or(rules.default_sector),
        symbol: ticker.symbol,
        name: ticker.name,
        price,
        change_percent: trend.change_percent,
        avg_volume,
        trend: trend.trend.direction(),
        day_high: trend.day_high,
        day_low: trend.day_low,
        open_price: trend.day_open,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_flags_all_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn progress_snapshot_tracks_counters() {
        let progress = ScanProgress::default();
        progress.begin(3, "scanning 3 tickers");
        progress.record_item();
        progress.record_item();

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.current, 2);
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.status, "scanned 2 of 3 tickers");
    }
}
