//! Rows produced by the aligner and the metrics finalizer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fundamental::FundamentalRow;
use super::window::GrowthRatios;

/// A fundamentals row joined with the first trade inside its price window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub fundamentals: FundamentalRow,
    pub trade_date: NaiveDate,
    pub price: f64,
}

impl AlignedRecord {
    pub fn ticker(&self) -> &str {
        self.fundamentals.ticker()
    }

    pub fn report_date(&self) -> NaiveDate {
        self.fundamentals.report_date()
    }
}

/// A finished output row: aligned record plus valuation and price growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub aligned: AlignedRecord,
    pub market_cap: Option<f64>,
    pub price_growth: GrowthRatios,
}

impl DatasetRow {
    pub fn ticker(&self) -> &str {
        self.aligned.ticker()
    }

    pub fn report_date(&self) -> NaiveDate {
        self.aligned.report_date()
    }

    pub fn price(&self) -> f64 {
        self.aligned.price
    }

    pub fn fundamentals(&self) -> &FundamentalRow {
        &self.aligned.fundamentals
    }
}
