//! Daily share prices, grouped into per-ticker series sorted by trade date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One adjusted close observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub price: f64,
}

/// A single point in a ticker's price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub trade_date: NaiveDate,
    pub price: f64,
}

/// All price series for one market, keyed by ticker.
///
/// Each series is sorted ascending by trade date. The sort is stable, so
/// duplicate timestamps keep the order they arrived in.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    series: HashMap<String, Vec<PricePoint>>,
}

impl PriceBook {
    pub fn from_records(records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut series: HashMap<String, Vec<PricePoint>> = HashMap::new();
        for r in records {
            series.entry(r.ticker).or_default().push(PricePoint {
                trade_date: r.trade_date,
                price: r.price,
            });
        }
        for points in series.values_mut() {
            points.sort_by_key(|p| p.trade_date);
        }
        Self { series }
    }

    /// Sorted series for `ticker`, empty if the ticker has no prices.
    pub fn series(&self, ticker: &str) -> &[PricePoint] {
        self.series.get(ticker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }

    pub fn observation_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ticker: &str, date: &str, price: f64) -> PriceRecord {
        PriceRecord {
            ticker: ticker.into(),
            trade_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            price,
        }
    }

    #[test]
    fn series_are_sorted_per_ticker() {
        let book = PriceBook::from_records(vec![
            rec("MSFT", "2021-01-06", 3.0),
            rec("AAPL", "2021-01-05", 2.0),
            rec("MSFT", "2021-01-04", 1.0),
        ]);
        let msft = book.series("MSFT");
        assert_eq!(msft.len(), 2);
        assert!(msft[0].trade_date < msft[1].trade_date);
        assert_eq!(msft[0].price, 1.0);
        assert_eq!(book.ticker_count(), 2);
        assert_eq!(book.observation_count(), 3);
    }

    #[test]
    fn unknown_ticker_has_empty_series() {
        let book = PriceBook::default();
        assert!(book.is_empty());
        assert!(book.series("NOPE").is_empty());
    }
}
