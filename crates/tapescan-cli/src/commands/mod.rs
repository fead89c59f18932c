//! Command dispatch.

mod check;
mod scan;

use tapescan_core::StockRecord;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced, rendered by the caller.
pub enum CommandOutput {
    Records(Vec<StockRecord>),
    Message(String),
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(args).await.map(CommandOutput::Records),
        Command::Check => check::run().map(CommandOutput::Message),
    }
}
