//! API client for the upstream market-data provider.
//!
//! Three logical queries, each funneled through the
//! [`RequestScheduler`](crate::scheduler::RequestScheduler):
//!
//! | Operation | Endpoint | Failure policy |
//! |-----------|----------|----------------|
//! | [`list_universe`](MarketDataClient::list_universe) | `/v3/reference/tickers` | scan-critical: typed error to the caller |
//! | [`current_price`](MarketDataClient::current_price) | `/v1/open-close/{symbol}/{date}` | scan-tolerant: 404 becomes absent |
//! | [`historical_bars`](MarketDataClient::historical_bars) | `/v2/aggs/ticker/{symbol}/range/1/day/{start}/{end}` | scan-tolerant: 404 becomes empty |
//!
//! Classification of transport and HTTP failures into the
//! [`ScanError`] taxonomy happens here; the orchestrator decides
//! whether a given error aborts the scan or only drops one ticker.

use std::time::Duration;

use serde::Deserialize;
use time::{Date, OffsetDateTime, Weekday};
use tracing::debug;

use crate::config::ScanConfig;
use crate::domain::{HistoricalBar, PriceSnapshot, Ticker};
use crate::error::{ScanError, ValidationError};
use crate::http::HttpRequest;
use crate::scheduler::RequestScheduler;
use crate::Symbol;

const UNIVERSE_PAGE_LIMIT: u32 = 1000;

/// Client for the three market-data queries.
///
/// Cloning is cheap and all clones share the scheduler's queue, so
/// per-ticker tasks can each hold their own handle.
#[derive(Clone)]
pub struct MarketDataClient {
    scheduler: RequestScheduler,
    base_url: String,
    api_key: String,
    exchange: String,
    request_timeout: Duration,
}

impl MarketDataClient {
    pub fn new(scheduler: RequestScheduler, config: &ScanConfig) -> Self {
        Self {
            scheduler,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            exchange: config.exchange.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// List active tickers on the configured exchange.
    ///
    /// Scan-critical: every failure surfaces as a typed [`ScanError`].
    /// An empty-but-successful listing is returned as-is; the
    /// orchestrator decides that it is fatal.
    pub async fn list_universe(&self) -> Result<Vec<Ticker>, ScanError> {
        let request = self
            .request(format!("{}/v3/reference/tickers", self.base_url))
            .with_query("market", "stocks")
            .with_query("exchange", &self.exchange)
            .with_query("active", "true")
            .with_query("limit", UNIVERSE_PAGE_LIMIT.to_string())
            .with_query("sort", "ticker");

        let response = self
            .scheduler
            .submit(request)
            .await
            .map_err(ScanError::from_transport)?;
        if !response.is_success() {
            return Err(ScanError::from_status(response.status, &response.body));
        }

        let payload: TickersPayload = serde_json::from_str(&response.body)
            .map_err(|e| ScanError::Payload(format!("ticker listing: {e}")))?;

        let mut tickers = Vec::with_capacity(payload.results.len());
        for row in payload.results {
            match normalize_ticker(row) {
                Ok(ticker) => tickers.push(ticker),
                Err(error) => {
                    debug!(error = %error, "dropping malformed ticker row");
                }
            }
        }
        Ok(tickers)
    }

    /// Fetch today's open/close snapshot for one ticker.
    ///
    /// A 404 (unknown symbol, or no session data yet) is an absent
    /// result, not an error; other failures are returned typed and the
    /// orchestrator degrades them to "no record" for this ticker.
    pub async fn current_price(&self, symbol: &Symbol) -> Result<Option<PriceSnapshot>, ScanError> {
        let today = today_utc();
        let request = self.request(format!(
            "{}/v1/open-close/{}/{}",
            self.base_url,
            symbol,
            format_date(today)
        ));
        let request = request.with_query("adjusted", "true");

        let response = self
            .scheduler
            .submit(request)
            .await
            .map_err(ScanError::from_transport)?;
        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(ScanError::from_status(response.status, &response.body));
        }

        let payload: DailyOpenClosePayload = serde_json::from_str(&response.body)
            .map_err(|e| ScanError::Payload(format!("daily open/close for {symbol}: {e}")))?;
        let snapshot = normalize_snapshot(symbol.clone(), payload)?;
        Ok(Some(snapshot))
    }

    /// Fetch day-granularity bars covering `window_days` back from
    /// today, with the start shifted to the previous trading day when
    /// it lands on a weekend.
    ///
    /// Bars come back ascending by date. A 404 is an empty series.
    pub async fn historical_bars(
        &self,
        symbol: &Symbol,
        window_days: u32,
    ) -> Result<Vec<HistoricalBar>, ScanError> {
        let end = today_utc();
        let start = backshift_to_trading_day(end - time::Duration::days(i64::from(window_days)));

        let request = self
            .request(format!(
                "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
                self.base_url,
                symbol,
                format_date(start),
                format_date(end)
            ))
            .with_query("adjusted", "true")
            .with_query("sort", "asc");

        let response = self
            .scheduler
            .submit(request)
            .await
            .map_err(ScanError::from_transport)?;
        if response.status == 404 {
            return Ok(Vec::new());
        }
        if !response.is_success() {
            return Err(ScanError::from_status(response.status, &response.body));
        }

        let payload: AggregatesPayload = serde_json::from_str(&response.body)
            .map_err(|e| ScanError::Payload(format!("aggregates for {symbol}: {e}")))?;

        let mut bars = Vec::with_capacity(payload.results.len());
        for row in payload.results {
            bars.push(normalize_bar(row)?);
        }
        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::get(url)
            .with_query("apikey", &self.api_key)
            .with_timeout(self.request_timeout)
    }
}

#[derive(Debug, Deserialize)]
struct TickersPayload {
    #[serde(default)]
    results: Vec<TickerRow>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    ticker: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    primary_exchange: Option<String>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    weighted_shares_outstanding: Option<f64>,
    #[serde(default = "default_active")]
    active: bool,
}

const fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct DailyOpenClosePayload {
    from: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct AggregatesPayload {
    #[serde(default)]
    results: Vec<AggregateRow>,
}

#[derive(Debug, Deserialize)]
struct AggregateRow {
    /// Bar timestamp in unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

fn normalize_ticker(row: TickerRow) -> Result<Ticker, ValidationError> {
    let symbol = Symbol::parse(&row.ticker)?;
    let name = row.name.unwrap_or_else(|| symbol.as_str().to_owned());
    Ok(Ticker {
        symbol,
        name,
        exchange: row.primary_exchange,
        market_cap: row.market_cap,
        shares_outstanding: row.weighted_shares_outstanding,
        active: row.active,
    })
}

fn normalize_snapshot(
    symbol: Symbol,
    payload: DailyOpenClosePayload,
) -> Result<PriceSnapshot, ScanError> {
    let as_of = parse_date(&payload.from)?;
    let snapshot = PriceSnapshot::new(
        symbol,
        payload.open,
        payload.high,
        payload.low,
        payload.close,
        payload.volume.round() as u64,
        as_of,
    )?;
    Ok(snapshot)
}

fn normalize_bar(row: AggregateRow) -> Result<HistoricalBar, ScanError> {
    let date = date_from_unix_ms(row.t)?;
    let bar = HistoricalBar::new(date, row.o, row.h, row.l, row.c, row.v.round() as u64)?;
    Ok(bar)
}

/// Shift a date backward by whole days until it is not a weekend.
fn backshift_to_trading_day(mut date: Date) -> Date {
    while matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
        date = date
            .previous_day()
            .expect("dates in scan range have a previous day");
    }
    date
}

fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

const DATE_FORMAT: &str = "[year]-[month]-[day]";

fn format_date(date: Date) -> String {
    let format = time::format_description::parse(DATE_FORMAT)
        .expect("static date format description is valid");
    date.format(&format)
        .expect("calendar dates format with the static description")
}

fn parse_date(value: &str) -> Result<Date, ValidationError> {
    let format = time::format_description::parse(DATE_FORMAT)
        .expect("static date format description is valid");
    Date::parse(value, &format).map_err(|_| ValidationError::InvalidDate {
        value: value.to_owned(),
    })
}

fn date_from_unix_ms(ms: i64) -> Result<Date, ScanError> {
    let timestamp = OffsetDateTime::from_unix_timestamp(ms.div_euclid(1000))
        .map_err(|_| ScanError::Payload(format!("bar timestamp {ms} is out of range")))?;
    Ok(timestamp.date())
}
