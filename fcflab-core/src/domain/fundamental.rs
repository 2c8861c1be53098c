//! Quarterly fundamentals and the free-cash-flow figures derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::window::GrowthRatios;

/// One quarterly report for one ticker, as joined from the cash-flow and
/// income tables.
///
/// Provider cells can be blank, so every figure is optional. CapEx is a
/// non-positive cash delta (money spent shows up negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    pub ticker: String,
    pub report_date: NaiveDate,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub shares_basic: Option<f64>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
}

impl FundamentalRecord {
    /// FCF = OCF + CapEx.
    pub fn free_cash_flow(&self) -> Option<f64> {
        Some(self.operating_cash_flow? + self.capital_expenditure?)
    }

    /// FCF divided by basic shares; undefined for zero share counts.
    pub fn free_cash_flow_per_share(&self) -> Option<f64> {
        let shares = self.shares_basic?;
        if shares == 0.0 {
            return None;
        }
        let per_share = self.free_cash_flow()? / shares;
        per_share.is_finite().then_some(per_share)
    }
}

/// Output of the fundamentals builder: a record plus its FCF figures and
/// trailing FCF-per-share growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRow {
    pub record: FundamentalRecord,
    pub fcf: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub fcf_ps_growth: GrowthRatios,
}

impl FundamentalRow {
    pub fn new(record: FundamentalRecord) -> Self {
        let fcf = record.free_cash_flow();
        let fcf_per_share = record.free_cash_flow_per_share();
        Self {
            record,
            fcf,
            fcf_per_share,
            fcf_ps_growth: GrowthRatios::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.record.ticker
    }

    pub fn report_date(&self) -> NaiveDate {
        self.record.report_date
    }
}
