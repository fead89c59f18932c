//! Scan configuration surface.
//!
//! Defaults mirror the free-tier limits of the upstream API: 5 requests
//! per minute, 30-second request deadline, 3 retry attempts with a
//! 1-second base delay.

use std::time::Duration;

use crate::domain::Timeframe;
use crate::error::ScanError;
use crate::retry::RetryPolicy;
use crate::scheduler::RateBudget;
use crate::trend::TrendThresholds;

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const API_KEY_ENV: &str = "TAPESCAN_API_KEY";

/// Credential fragments that mark an unconfigured key.
const PLACEHOLDER_FRAGMENTS: &[&str] = &["your-api-key", "changeme", "undefined", "null"];
const MIN_CREDENTIAL_LEN: usize = 11;

/// Lookback window, in days, for each scan timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeframeWindows {
    pub daily: u32,
    pub three_day: u32,
    pub weekly: u32,
}

impl Default for TimeframeWindows {
    fn default() -> Self {
        Self {
            daily: 1,
            three_day: 3,
            weekly: 7,
        }
    }
}

impl TimeframeWindows {
    pub const fn days_for(&self, timeframe: Timeframe) -> u32 {
        match timeframe {
            Timeframe::Daily => self.daily,
            Timeframe::ThreeDay => self.three_day,
            Timeframe::Weekly => self.weekly,
        }
    }
}

/// Everything the pipeline consumes from its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub base_url: String,
    pub api_key: String,
    /// Exchange tag passed to the universe listing (e.g. `XNAS`).
    pub exchange: String,
    /// Price ceiling; tickers above it never become records.
    pub max_price: f64,
    /// Average-volume floor applied to surviving candidates.
    pub min_volume: u64,
    /// Batch fan-out bound; not derived from the rate limit.
    pub batch_size: usize,
    /// Pause between batches, on top of the scheduler's pacing.
    pub inter_batch_delay: Duration,
    pub rate_budget: RateBudget,
    pub request_timeout: Duration,
    /// Applied only to the universe listing.
    pub retry: RetryPolicy,
    pub thresholds: TrendThresholds,
    pub windows: TimeframeWindows,
}

impl ScanConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: api_key.into(),
            exchange: String::from("XNAS"),
            max_price: 5.0,
            min_volume: 100_000,
            batch_size: 100,
            inter_batch_delay: Duration::from_secs(5),
            rate_budget: RateBudget::new(Duration::from_secs(60), 5),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::exponential(3, Duration::from_secs(1)),
            thresholds: TrendThresholds::default(),
            windows: TimeframeWindows::default(),
        }
    }

    /// Build from the environment, reading the credential from
    /// `TAPESCAN_API_KEY`.
    pub fn from_env() -> Result<Self, ScanError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            ScanError::Config(format!("{API_KEY_ENV} is not set; an API key is required"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Reject absent or placeholder credentials before any network call
    /// is issued.
    pub fn validate_credential(&self) -> Result<(), ScanError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(ScanError::Config(String::from(
                "API key is empty; set a real credential before scanning",
            )));
        }
        if key.len() < MIN_CREDENTIAL_LEN {
            return Err(ScanError::Config(String::from(
                "API key is too short to be a real credential",
            )));
        }
        let lowered = key.to_ascii_lowercase();
        for fragment in PLACEHOLDER_FRAGMENTS {
            if lowered.contains(fragment) {
                return Err(ScanError::Config(format!(
                    "API key looks like a placeholder (contains '{fragment}')"
                )));
            }
        }
        Ok(())
    }
}
