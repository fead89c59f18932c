//! Trend classification over a historical bar series.

use serde::{Deserialize, Serialize};

use crate::domain::{HistoricalBar, Trend, TrendResult};

/// Percent-change cut points for the categorical trend.
///
/// Evaluated strong-up, up, strong-down, down, neutral; first match
/// wins. Comparisons are inclusive, so a change of exactly `up`
/// classifies as up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub strong_up: f64,
    pub up: f64,
    pub down: f64,
    pub strong_down: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            strong_up: 3.0,
            up: 1.0,
            down: -1.0,
            strong_down: -3.0,
        }
    }
}

/// Classify a bar series into a [`TrendResult`].
///
/// Fewer than 2 bars cannot express a trend and yield neutral, 0%
/// change, 0 volume. The percent change is rounded to 2 decimals before
/// the thresholds are applied, so the category survives a
/// format-and-parse round trip of the displayed value.
pub fn classify(bars: &[HistoricalBar], thresholds: &TrendThresholds) -> TrendResult {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return neutral_result(None);
    };

    if bars.len() < 2 || first.close <= 0.0 {
        return neutral_result(Some(last));
    }

    let change_percent = round2((last.close - first.close) / first.close * 100.0);

    let volume_sum: u64 = bars.iter().map(|bar| bar.volume).sum();
    let avg_volume = (volume_sum as f64 / bars.len() as f64).round() as u64;

    let trend = if change_percent >= thresholds.strong_up {
        Trend::StrongUp
    } else if change_percent >= thresholds.up {
        Trend::Up
    } else if change_percent <= thresholds.strong_down {
        Trend::StrongDown
    } else if change_percent <= thresholds.down {
        Trend::Down
    } else {
        Trend::Neutral
    };

    TrendResult {
        trend,
        change_percent,
        avg_volume,
        last_close: last.close,
        day_open: last.open,
        day_high: last.high,
        day_low: last.low,
    }
}

fn neutral_result(last: Option<&HistoricalBar>) -> TrendResult {
    TrendResult {
        trend: Trend::Neutral,
        change_percent: 0.0,
        avg_volume: 0,
        last_close: last.map_or(0.0, |bar| bar.close),
        day_open: last.map_or(0.0, |bar| bar.open),
        day_high: last.map_or(0.0, |bar| bar.high),
        day_low: last.map_or(0.0, |bar| bar.low),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
