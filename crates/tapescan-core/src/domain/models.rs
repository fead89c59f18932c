use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::ValidationError;
use crate::Symbol;

/// Instrument metadata from the universe listing. Immutable for the
/// duration of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub name: String,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub active: bool,
}

const SHARES_OUTSTANDING_FALLBACK: f64 = 1_000_000.0;

impl Ticker {
    /// Estimated market capitalization at the given price.
    ///
    /// Prefers the upstream market-cap hint; otherwise a rough
    /// shares-outstanding estimate is used for display purposes.
    pub fn estimated_market_cap(&self, price: f64) -> f64 {
        if let Some(market_cap) = self.market_cap {
            return market_cap;
        }
        let shares = self
            .shares_outstanding
            .unwrap_or(SHARES_OUTSTANDING_FALLBACK);
        (shares * price).round()
    }
}

/// Daily open/close snapshot for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub symbol: Symbol,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub as_of: Date,
}

impl PriceSnapshot {
    pub fn new(
        symbol: Symbol,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        as_of: Date,
    ) -> Result<Self, ValidationError> {
        validate_ohlc(open, high, low, close)?;
        Ok(Self {
            symbol,
            open,
            high,
            low,
            close,
            volume,
            as_of,
        })
    }
}

/// Single day-granularity OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBar {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl HistoricalBar {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_ohlc(open, high, low, close)?;
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Categorical trend over a lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    StrongUp,
    Up,
    Neutral,
    Down,
    StrongDown,
}

impl Trend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongUp => "strong_up",
            Self::Up => "up",
            Self::Neutral => "neutral",
            Self::Down => "down",
            Self::StrongDown => "strong_down",
        }
    }

    /// Collapse to the display direction shown to callers.
    pub const fn direction(self) -> TrendDirection {
        match self {
            Self::StrongUp | Self::Up => TrendDirection::Up,
            Self::StrongDown | Self::Down => TrendDirection::Down,
            Self::Neutral => TrendDirection::Neutral,
        }
    }
}

/// Display-direction trend carried on a [`StockRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        }
    }
}

/// Derived trend statistics for one ticker's bar series.
///
/// Recomputed per scan and discarded with it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendResult {
    pub trend: Trend,
    /// Latest close vs. earliest close, percent, rounded to 2 decimals.
    pub change_percent: f64,
    /// Mean volume over the window, rounded to the nearest integer.
    pub avg_volume: u64,
    pub last_close: f64,
    pub day_open: f64,
    pub day_high: f64,
    pub day_low: f64,
}

/// Join of ticker metadata, price snapshot and trend result; the unit
/// returned to the caller. Identity is the ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: Symbol,
    pub name: String,
    pub price: f64,
    pub change_percent: f64,
    pub avg_volume: u64,
    pub market_cap: f64,
    pub sector: String,
    pub trend: TrendDirection,
    pub day_high: f64,
    pub day_low: f64,
    pub open_price: f64,
}

/// Scan lookback timeframe selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Daily,
    ThreeDay,
    Weekly,
}

impl Timeframe {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::ThreeDay => "3day",
            Self::Weekly => "weekly",
        }
    }
}

fn validate_ohlc(open: f64, high: f64, low: f64, close: f64) -> Result<(), ValidationError> {
    validate_non_negative("open", open)?;
    validate_non_negative("high", high)?;
    validate_non_negative("low", low)?;
    validate_non_negative("close", close)?;

    if high < low {
        return Err(ValidationError::InvalidBarRange);
    }
    if open < low || open > high || close < low || close > high {
        return Err(ValidationError::InvalidBarBounds);
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn date() -> Date {
        Date::from_calendar_date(2024, Month::March, 4).expect("valid date")
    }

    #[test]
    fn rejects_inverted_bar_range() {
        let err = HistoricalBar::new(date(), 2.0, 1.0, 3.0, 2.0, 100).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarRange));
    }

    #[test]
    fn rejects_close_outside_bounds() {
        let err = HistoricalBar::new(date(), 2.0, 3.0, 1.0, 3.5, 100).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarBounds));
    }

    #[test]
    fn market_cap_prefers_upstream_hint() {
        let ticker = Ticker {
            symbol: Symbol::parse("ABCD").expect("valid"),
            name: String::from("Abcd Inc."),
            exchange: Some(String::from("XNAS")),
            market_cap: Some(12_000_000.0),
            shares_outstanding: Some(4_000_000.0),
            active: true,
        };
        assert_eq!(ticker.estimated_market_cap(2.5), 12_000_000.0);
    }

    #[test]
    fn market_cap_estimates_from_shares() {
        let ticker = Ticker {
            symbol: Symbol::parse("ABCD").expect("valid"),
            name: String::from("Abcd Inc."),
            exchange: None,
            market_cap: None,
            shares_outstanding: Some(4_000_000.0),
            active: true,
        };
        assert_eq!(ticker.estimated_market_cap(2.5), 10_000_000.0);
    }

    #[test]
    fn trend_collapses_to_direction() {
        assert_eq!(Trend::StrongUp.direction(), TrendDirection::Up);
        assert_eq!(Trend::Down.direction(), TrendDirection::Down);
        assert_eq!(Trend::Neutral.direction(), TrendDirection::Neutral);
    }
}
