//! Behavior-driven tests for the rate-limited scheduler.
//!
//! The scheduler is the single serialization point for all network
//! I/O: N submissions must produce exactly N dispatches, in submission
//! order, spaced by at least the configured inter-request interval.

use std::sync::Arc;
use std::time::Duration;

use tapescan_core::http::{HttpRequest, HttpResponse};
use tapescan_core::{RateBudget, RequestScheduler};
use tapescan_tests::ScriptedTransport;

#[tokio::test]
async fn submissions_dispatch_once_each_in_fifo_order_with_spacing() {
    // Given: a scheduler paced at one request per 30ms
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub("example.test", Ok(HttpResponse::ok_json("{}")));
    let budget = RateBudget::new(Duration::from_millis(150), 5);
    assert_eq!(budget.interval(), Duration::from_millis(30));
    let scheduler = RequestScheduler::new(transport.clone(), budget);

    // When: three callers submit concurrently (polled in listed order,
    // so enqueue order is deterministic)
    let first = scheduler.submit(HttpRequest::get("https://example.test/one"));
    let second = scheduler.submit(HttpRequest::get("https://example.test/two"));
    let third = scheduler.submit(HttpRequest::get("https://example.test/three"));
    let (first, second, third) = tokio::join!(first, second, third);

    // Then: every caller got its own completion
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(third.is_ok());

    // And: exactly N dispatches, in submission order
    let calls = transport.recorded();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].url.ends_with("/one"));
    assert!(calls[1].url.ends_with("/two"));
    assert!(calls[2].url.ends_with("/three"));

    // And: consecutive dispatches are separated by the pacing interval
    // (small tolerance for timer granularity)
    for pair in calls.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(
            gap >= Duration::from_millis(28),
            "dispatch gap {gap:?} is below the pacing interval"
        );
    }
}

#[tokio::test]
async fn failures_are_returned_verbatim_without_retry() {
    // Given: a transport that always fails
    let transport = Arc::new(ScriptedTransport::new());
    transport.stub(
        "example.test",
        Err(tapescan_tests::HttpError::connect("connection refused")),
    );
    let scheduler = RequestScheduler::new(
        transport.clone(),
        RateBudget::new(Duration::from_millis(10), 10),
    );

    // When: a request is submitted
    let result = scheduler
        .submit(HttpRequest::get("https://example.test/quote"))
        .await;

    // Then: the failure comes back unchanged and nothing was retried
    let error = result.expect_err("transport failure should propagate");
    assert_eq!(error.message(), "connection refused");
    assert_eq!(transport.call_count(), 1);
}
