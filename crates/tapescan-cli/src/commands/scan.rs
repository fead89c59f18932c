use std::sync::Arc;
use std::time::Duration;

use tapescan_core::{
    sort_records, MarketDataClient, RecordFilter, ReqwestHttpClient, RequestScheduler, ScanConfig,
    Scanner, StockRecord,
};
use tracing::{info, warn};

use crate::cli::ScanArgs;
use crate::error::CliError;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

pub async fn run(args: &ScanArgs) -> Result<Vec<StockRecord>, CliError> {
    let mut config = ScanConfig::from_env()?;
    apply_overrides(&mut config, args);
    // Fail on a bad credential before spawning any machinery.
    config.validate_credential()?;

    let scheduler = RequestScheduler::new(Arc::new(ReqwestHttpClient::new()), config.rate_budget);
    let client = MarketDataClient::new(scheduler, &config);
    let scanner = Scanner::new(client, config);

    let cancel = scanner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling scan");
            cancel.cancel();
        }
    });

    let progress = scanner.progress();
    let reporter = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
        loop {
            ticker.tick().await;
            let snapshot = progress.snapshot();
            info!(
                current = snapshot.current,
                total = snapshot.total,
                status = %snapshot.status,
                "scan progress"
            );
        }
    });

    let result = scanner.scan(args.timeframe.into()).await;
    reporter.abort();
    let records = result?;

    let filter = RecordFilter {
        min_price: args.min_price,
        max_price: None,
        min_volume: None,
        sectors: args.sectors.clone(),
        query: args.query.clone(),
    };
    let mut records = filter.apply(&records);
    sort_records(&mut records, args.sort.into(), args.direction.into());
    Ok(records)
}

fn apply_overrides(config: &mut ScanConfig, args: &ScanArgs) {
    if let Some(max_price) = args.max_price {
        config.max_price = max_price;
    }
    if let Some(min_volume) = args.min_volume {
        config.min_volume = min_volume;
    }
    if let Some(exchange) = &args.exchange {
        config.exchange = exchange.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
}
