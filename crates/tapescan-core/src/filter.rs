//! Post-scan record filtering and sorting.

use serde::{Deserialize, Serialize};

use crate::domain::StockRecord;

/// Caller-selected filters applied to a scan's surviving records.
///
/// Empty sector set and empty query mean "no filter" for that axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_volume: Option<u64>,
    pub sectors: Vec<String>,
    pub query: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &StockRecord) -> bool {
        if let Some(min_price) = self.min_price {
            if record.price < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if record.price > max_price {
                return false;
            }
        }
        if let Some(min_volume) = self.min_volume {
            if record.avg_volume < min_volume {
                return false;
            }
        }
        if !self.sectors.is_empty() {
            let sector = record.sector.to_ascii_lowercase();
            if !self
                .sectors
                .iter()
                .any(|candidate| candidate.to_ascii_lowercase() == sector)
            {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let query = query.trim().to_ascii_lowercase();
            if !query.is_empty() {
                let symbol = record.symbol.as_str().to_ascii_lowercase();
                let name = record.name.to_ascii_lowercase();
                if !symbol.contains(&query) && !name.contains(&query) {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply(&self, records: &[StockRecord]) -> Vec<StockRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Sort key for the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Symbol,
    Price,
    ChangePercent,
    Volume,
    MarketCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Stable sort by the selected key and direction.
pub fn sort_records(records: &mut [StockRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Symbol => a.symbol.as_str().cmp(b.symbol.as_str()),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::ChangePercent => a.change_percent.total_cmp(&b.change_percent),
            SortKey::Volume => a.avg_volume.cmp(&b.avg_volume),
            SortKey::MarketCap => a.market_cap.total_cmp(&b.market_cap),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::Symbol;

    use super::*;

    fn record(symbol: &str, price: f64, volume: u64, sector: &str) -> StockRecord {
        StockRecord {
            symbol: Symbol::parse(symbol).expect("valid symbol"),
            name: format!("{symbol} Inc."),
            price,
            change_percent: 1.5,
            avg_volume: volume,
            market_cap: 1_000_000.0,
            sector: String::from(sector),
            trend: crate::TrendDirection::Up,
            day_high: price,
            day_low: price,
            open_price: price,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("AAA", 1.0, 100, "XNAS")));
    }

    #[test]
    fn query_matches_symbol_or_name_case_insensitively() {
        let filter = RecordFilter {
            query: Some(String::from("aa")),
            ..RecordFilter::default()
        };
        assert!(filter.matches(&record("AAA", 1.0, 100, "XNAS")));
        assert!(!filter.matches(&record("BBB", 1.0, 100, "XNAS")));
    }

    #[test]
    fn sector_filter_ignores_case() {
        let filter = RecordFilter {
            sectors: vec![String::from("xnas")],
            ..RecordFilter::default()
        };
        assert!(filter.matches(&record("AAA", 1.0, 100, "XNAS")));
        assert!(!filter.matches(&record("AAA", 1.0, 100, "ARCA")));
    }

    #[test]
    fn sorts_by_volume_descending() {
        let mut records = vec![
            record("AAA", 1.0, 100, "XNAS"),
            record("BBB", 1.0, 300, "XNAS"),
            record("CCC", 1.0, 200, "XNAS"),
        ];
        sort_records(&mut records, SortKey::Volume, SortDirection::Descending);
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["BBB", "CCC", "AAA"]);
    }
}
