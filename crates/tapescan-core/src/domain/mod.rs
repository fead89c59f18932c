//! Domain models for the scan pipeline.

mod models;
mod symbol;

pub use models::{
    HistoricalBar, PriceSnapshot, StockRecord, Ticker, Timeframe, Trend, TrendDirection,
    TrendResult,
};
pub use symbol::Symbol;
