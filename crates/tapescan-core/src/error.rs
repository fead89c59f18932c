use thiserror::Error;

use crate::http::{HttpError, HttpErrorKind};

/// Validation errors raised by domain type constructors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,

    #[error("invalid calendar date '{value}'")]
    InvalidDate { value: String },
}

/// Closed error taxonomy for the scan pipeline.
///
/// Failures on the universe-listing path surface one of these to the
/// caller after retry exhaustion. Failures on a per-ticker path are
/// caught at the task boundary, logged, and converted to "no record"
/// without aborting the batch or the scan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Credential missing or placeholder; the scan never starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// 401 from upstream; almost certainly a credential problem.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// 403 from upstream; permission or subscription tier problem.
    #[error("access forbidden: {0}")]
    Forbidden(String),

    /// 429 from upstream.
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Connection-level transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Request deadline exceeded.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other non-success response.
    #[error("upstream returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// Successful universe listing with zero results.
    #[error("universe listing returned no tickers")]
    EmptyUniverse,

    /// The scan's cancellation token fired.
    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// Classify a transport-level failure.
    pub fn from_transport(error: HttpError) -> Self {
        match error.kind() {
            HttpErrorKind::Timeout => Self::Timeout(error.message().to_owned()),
            HttpErrorKind::Connect | HttpErrorKind::Other => {
                Self::Network(error.message().to_owned())
            }
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = summarize_body(body);
        match status {
            401 => Self::Auth(message),
            403 => Self::Forbidden(message),
            429 => Self::RateLimited(message),
            _ => Self::Api { status, message },
        }
    }

    /// Stable machine-readable code for presentation layers.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "scan.config",
            Self::Auth(_) => "scan.auth",
            Self::Forbidden(_) => "scan.forbidden",
            Self::RateLimited(_) => "scan.rate_limited",
            Self::Network(_) => "scan.network",
            Self::Timeout(_) => "scan.timeout",
            Self::Api { .. } => "scan.api",
            Self::Payload(_) => "scan.payload",
            Self::EmptyUniverse => "scan.empty_universe",
            Self::Cancelled => "scan.cancelled",
        }
    }
}

impl From<ValidationError> for ScanError {
    fn from(error: ValidationError) -> Self {
        Self::Payload(error.to_string())
    }
}

const MAX_BODY_SUMMARY: usize = 160;

fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::from("(empty body)");
    }
    trimmed.chars().take(MAX_BODY_SUMMARY).collect()
}
