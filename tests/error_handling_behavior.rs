//! Behavior-driven tests for the error taxonomy and the
//! universe-fatal vs. per-ticker-tolerated split.

use std::sync::Arc;
use std::time::Duration;

use tapescan_core::http::HttpResponse;
use tapescan_core::{
    Backoff, MarketDataClient, RequestScheduler, RetryPolicy, ScanError, Scanner, Timeframe,
};
use tapescan_tests::{aggs_body, bar_ts, open_close_body, scan_config, tickers_body, ScriptedTransport};

fn scanner_for(transport: Arc<ScriptedTransport>, retry_attempts: u32) -> Scanner {
    let mut config = scan_config();
    config.retry = RetryPolicy {
        max_attempts: retry_attempts,
        backoff: Backoff::Fixed {
            delay: Duration::from_millis(1),
        },
    };
    let scheduler = RequestScheduler::new(transport, config.rate_budget);
    let client = MarketDataClient::new(scheduler, &config);
    Scanner::new(client, config)
}

#[tokio::test]
async fn placeholder_credential_never_touches_the_network() {
    // Given: a configuration with an unconfigured credential
    let transport = Arc::new(ScriptedTransport::new());
    let mut config = scan_config();
    config.api_key = String::from("insert-your-api-key-here");
    let scheduler = RequestScheduler::new(transport.clone(), config.rate_budget);
    let client = MarketDataClient::new(scheduler, &config);
    let scanner = Scanner::new(client, config);

    // When / Then: a configuration error, with zero transport calls
    let error = scanner
        .scan(Timeframe::Daily)
        .await
        .expect_err("placeholder credentials must not scan");
    assert!(matches!(error, ScanError::Config(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn unauthorized_universe_listing_is_fatal_after_retries() {
    // Given: the listing endpoint always answers 401
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "/v3/reference/tickers",
        Ok(HttpResponse::with_status(401, "unknown api key")),
    );

    let scanner = scanner_for(transport.clone(), 2);

    // When
    let error = scanner
        .scan(Timeframe::Daily)
        .await
        .expect_err("auth failures are fatal");

    // Then: the kind survives retry exhaustion, and the retry layer
    // issued exactly max_attempts calls
    assert!(matches!(error, ScanError::Auth(_)));
    assert_eq!(error.code(), "scan.auth");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn forbidden_and_throttled_listings_keep_their_kinds() {
    for (status, code) in [(403, "scan.forbidden"), (429, "scan.rate_limited")] {
        let transport = Arc::new(ScriptedTransport::new());
        transport.stub(
            "/v3/reference/tickers",
            Ok(HttpResponse::with_status(status, "denied")),
        );

        let scanner = scanner_for(transport, 1);
        let error = scanner
            .scan(Timeframe::Daily)
            .await
            .expect_err("non-success listing is fatal");
        assert_eq!(error.code(), code, "status {status}");
    }
}

#[tokio::test]
async fn other_statuses_become_generic_api_errors() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "/v3/reference/tickers",
        Ok(HttpResponse::with_status(500, "internal error")),
    );

    let scanner = scanner_for(transport, 1);
    let error = scanner
        .scan(Timeframe::Daily)
        .await
        .expect_err("5xx listing is fatal");
    assert!(matches!(error, ScanError::Api { status: 500, .. }));
}

#[tokio::test]
async fn undecodable_listing_payload_is_fatal() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "/v3/reference/tickers",
        Ok(HttpResponse::ok_json("<html>not json</html>")),
    );

    let scanner = scanner_for(transport, 1);
    let error = scanner
        .scan(Timeframe::Daily)
        .await
        .expect_err("garbage payload is fatal on the universe path");
    assert!(matches!(error, ScanError::Payload(_)));
}

/// The central failure-isolation decision: a throttled per-ticker call
/// is logged and dropped, never raised.
#[tokio::test]
async fn per_ticker_throttling_does_not_abort_the_scan() {
    // Given: B's price lookup answers 429, C is a clean mover
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "/v3/reference/tickers",
        Ok(HttpResponse::ok_json(tickers_body(&[
            ("B", "Beta Corp"),
            ("C", "Gamma Corp"),
        ]))),
    );
    transport.stub(
        "/v1/open-close/B/",
        Ok(HttpResponse::with_status(429, "slow down")),
    );
    transport.stub(
        "/v1/open-close/C/",
        Ok(HttpResponse::ok_json(open_close_body("C", 1.0, 500_000.0))),
    );
    transport.stub(
        "/v2/aggs/ticker/C/",
        Ok(HttpResponse::ok_json(aggs_body(&[
            (bar_ts(0), 1.0, 1.0, 1.0, 1.0, 150_000.0),
            (bar_ts(1), 1.0, 1.05, 0.98, 1.05, 250_000.0),
        ]))),
    );

    let scanner = scanner_for(transport.clone(), 1);

    // When
    let records = scanner
        .scan(Timeframe::Weekly)
        .await
        .expect("per-ticker failures are tolerated");

    // Then: C still produced its record, and B was not retried
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].symbol.as_str(), "C");
    assert_eq!(transport.calls_matching("/v1/open-close/B/"), 1);
}

#[tokio::test]
async fn missing_price_data_skips_the_ticker() {
    // Given: the price endpoint knows nothing about the symbol
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "/v3/reference/tickers",
        Ok(HttpResponse::ok_json(tickers_body(&[("GHO", "Ghost Corp")]))),
    );
    transport.stub(
        "/v1/open-close/GHO/",
        Ok(HttpResponse::with_status(404, "not found")),
    );

    let scanner = scanner_for(transport.clone(), 1);

    // When
    let records = scanner
        .scan(Timeframe::Daily)
        .await
        .expect("absent data is not an error");

    // Then: no record, and the history lookup was skipped entirely
    assert!(records.is_empty());
    assert_eq!(transport.calls_matching("/v2/aggs/ticker/GHO/"), 0);
}
