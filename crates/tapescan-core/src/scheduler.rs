//! Rate-limited request scheduler.
//!
//! All outbound API calls funnel through one [`RequestScheduler`]: a
//! FIFO queue drained by a single worker task, so at most one physical
//! call is in flight system-wide. The worker acquires a rate cell from
//! a `governor` limiter before each dispatch, which spaces consecutive
//! dispatches by at least the configured inter-request interval while
//! letting a request dispatch immediately after an idle period.
//!
//! The scheduler never retries; failures are returned verbatim to the
//! submitting caller.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Requests-per-window budget the upstream tier allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub window: Duration,
    pub limit: u32,
}

impl RateBudget {
    pub const fn new(window: Duration, limit: u32) -> Self {
        Self { window, limit }
    }

    /// The pacing interval between consecutive dispatches.
    pub fn interval(&self) -> Duration {
        self.window / self.limit.max(1)
    }
}

struct Job {
    request: HttpRequest,
    reply: oneshot::Sender<Result<HttpResponse, HttpError>>,
}

/// Serializing, paced dispatcher for outbound API calls.
///
/// Cloning is cheap; all clones share the same queue and worker.
#[derive(Clone)]
pub struct RequestScheduler {
    queue: mpsc::UnboundedSender<Job>,
}

impl RequestScheduler {
    /// Spawn the worker task. Must be called within a tokio runtime.
    pub fn new(transport: Arc<dyn HttpClient>, budget: RateBudget) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        let limiter: Arc<DirectRateLimiter> =
            Arc::new(RateLimiter::direct(quota_from_budget(budget)));

        tokio::spawn(async move {
            while let Some(job) = jobs.recv().await {
                limiter.until_ready().await;
                debug!(url = %job.request.url, "dispatching request");
                let result = transport.execute(job.request).await;
                // Submitter may have dropped its receiver.
                let _ = job.reply.send(result);
            }
        });

        Self { queue }
    }

    /// Enqueue a request and wait for its completion signal.
    ///
    /// Requests are serviced strictly in submission order.
    pub async fn submit(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let (reply, completion) = oneshot::channel();
        self.queue
            .send(Job { request, reply })
            .map_err(|_| HttpError::other("request scheduler worker has shut down"))?;

        completion
            .await
            .map_err(|_| HttpError::other("request scheduler dropped the reply channel"))?
    }
}

fn quota_from_budget(budget: RateBudget) -> Quota {
    let interval = budget.interval().max(Duration::from_millis(1));
    let burst = NonZeroU32::new(1).expect("burst of one is non-zero");

    Quota::with_period(interval)
        .expect("interval is always greater than zero")
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_divides_window_by_limit() {
        let budget = RateBudget::new(Duration::from_secs(60), 5);
        assert_eq!(budget.interval(), Duration::from_secs(12));
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        let budget = RateBudget::new(Duration::from_secs(60), 0);
        assert_eq!(budget.interval(), Duration::from_secs(60));
    }
}
