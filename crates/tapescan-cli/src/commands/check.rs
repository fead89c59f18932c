use tapescan_core::ScanConfig;

use crate::error::CliError;

/// Validate the configured credential without issuing network calls.
pub fn run() -> Result<String, CliError> {
    let config = ScanConfig::from_env()?;
    config.validate_credential()?;
    Ok(format!(
        "credential ok; scanning {} at {} with a budget of {} requests per {:?}",
        config.exchange, config.base_url, config.rate_budget.limit, config.rate_budget.window
    ))
}
