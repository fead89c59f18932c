//! Result rendering for the terminal.

use tapescan_core::StockRecord;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(records: &[StockRecord], format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => render_json(records, pretty),
        OutputFormat::Table => {
            render_table(records);
            Ok(())
        }
    }
}

fn render_json(records: &[StockRecord], pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    println!("{rendered}");
    Ok(())
}

fn render_table(records: &[StockRecord]) {
    if records.is_empty() {
        println!("no candidates matched the scan criteria");
        return;
    }

    println!(
        "{:<8} {:<24} {:>8} {:>9} {:>12} {:>16} {:<8} {:<8}",
        "SYMBOL", "NAME", "PRICE", "CHANGE", "AVG VOL", "MKT CAP", "SECTOR", "TREND"
    );
    for record in records {
        println!(
            "{:<8} {:<24} {:>8.2} {:>+8.2}% {:>12} {:>16.0} {:<8} {:<8}",
            record.symbol,
            truncate(&record.name, 24),
            record.price,
            record.change_percent,
            record.avg_volume,
            record.market_cap,
            record.sector,
            record.trend.as_str(),
        );
    }
    println!();
    println!("{} candidate(s)", records.len());
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    let mut truncated: String = value.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
