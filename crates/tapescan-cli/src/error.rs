use tapescan_core::ScanError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Scan(error) => match error {
                ScanError::Config(_) => 2,
                ScanError::Auth(_) | ScanError::Forbidden(_) => 3,
                ScanError::RateLimited(_) => 4,
                ScanError::Network(_) | ScanError::Timeout(_) => 5,
                ScanError::Api { .. } | ScanError::Payload(_) => 6,
                ScanError::EmptyUniverse => 7,
                ScanError::Cancelled => 130,
            },
            Self::Serialization(_) => 8,
            Self::Io(_) => 10,
        }
    }
}
