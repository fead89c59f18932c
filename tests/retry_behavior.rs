//! Behavior-driven tests for the retry policy.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tapescan_core::{with_retry, Backoff, RetryPolicy, ScanError};

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Backoff::Fixed {
            delay: Duration::from_millis(1),
        },
    }
}

#[tokio::test]
async fn succeeds_after_transient_failures() {
    // Given: an operation that fails twice, then succeeds
    let attempts = AtomicU32::new(0);

    // When: retried with three total attempts
    let result: Result<u32, ScanError> = with_retry(&quick_policy(3), || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(ScanError::Network(String::from("flaky upstream")))
            } else {
                Ok(42)
            }
        }
    })
    .await;

    // Then: the success value is returned and exactly 3 attempts ran
    assert_eq!(result.expect("third attempt succeeds"), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhaustion_preserves_the_original_error_kind() {
    // Given: an operation that always fails with a rate-limit error
    let attempts = AtomicU32::new(0);

    // When: retried to exhaustion
    let result: Result<u32, ScanError> = with_retry(&quick_policy(3), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async move { Err(ScanError::RateLimited(String::from("too many requests"))) }
    })
    .await;

    // Then: the last failure is re-raised unchanged after exactly
    // max_attempts attempts
    let error = result.expect_err("all attempts fail");
    assert!(matches!(error, ScanError::RateLimited(_)));
    assert_eq!(error.code(), "scan.rate_limited");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn first_success_short_circuits() {
    let attempts = AtomicU32::new(0);

    let result: Result<&str, ScanError> = with_retry(&quick_policy(5), || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async move { Ok("done") }
    })
    .await;

    assert_eq!(result.expect("first attempt succeeds"), "done");
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
