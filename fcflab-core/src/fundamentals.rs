//! Fundamentals builder.
//!
//! Joins the quarterly cash-flow and income tables on (ticker, report date),
//! derives FCF and FCF per share, drops reports before the start year and
//! computes trailing FCF-per-share growth per ticker.

use chrono::{Datelike, NaiveDate};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::{DataError, RawTable};
use crate::domain::{FundamentalRecord, FundamentalRow, GrowthWindow};
use crate::growth::apply_grouped_growth;

pub const TICKER: &str = "Ticker";
pub const REPORT_DATE: &str = "Report Date";
pub const OPERATING_CASH_FLOW: &str = "Net Cash from Operating Activities";
pub const SHARES_BASIC: &str = "Shares (Basic)";
pub const REVENUE: &str = "Revenue";
pub const NET_INCOME: &str = "Net Income";

/// CapEx column names in priority order. Providers have renamed this column
/// across releases.
pub const DEFAULT_CAPEX_CANDIDATES: [&str; 4] = [
    "Change in Fixed Assets & Intangibles",
    "Purchase of PPE & Intangibles, net",
    "Capital Expenditures (Fixed Assets)",
    "Capital Expenditures",
];

#[derive(Debug, Error)]
pub enum FundamentalsError {
    #[error("CapEx column not found. Tried {tried:?}")]
    CapexColumnNotFound { tried: Vec<String> },

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Knobs for [`build_fundamentals`].
#[derive(Debug, Clone)]
pub struct FundamentalsOptions {
    pub capex_candidates: Vec<String>,
    pub start_year: i32,
    pub windows: Vec<GrowthWindow>,
    /// Read Revenue and Net Income from the income table.
    pub include_income_details: bool,
}

impl Default for FundamentalsOptions {
    fn default() -> Self {
        Self {
            capex_candidates: DEFAULT_CAPEX_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            start_year: 2000,
            windows: vec![GrowthWindow::ONE_YEAR, GrowthWindow::TWO_YEARS],
            include_income_details: false,
        }
    }
}

/// First candidate present in the table.
pub fn resolve_capex_column<'a>(
    table: &RawTable,
    candidates: &'a [String],
) -> Result<&'a str, FundamentalsError> {
    candidates
        .iter()
        .find(|c| table.has_column(c))
        .map(String::as_str)
        .ok_or_else(|| FundamentalsError::CapexColumnNotFound {
            tried: candidates.to_vec(),
        })
}

#[derive(Debug, Clone, Copy)]
struct IncomeFields {
    shares_basic: Option<f64>,
    revenue: Option<f64>,
    net_income: Option<f64>,
}

type Key = (String, NaiveDate);

/// Build one row per (ticker, report date) present in both tables.
///
/// Rows come back sorted by ticker, then report date, with
/// `fcf_ps_growth` filled for every configured window.
pub fn build_fundamentals(
    cashflow: &RawTable,
    income: &RawTable,
    opts: &FundamentalsOptions,
) -> Result<Vec<FundamentalRow>, FundamentalsError> {
    let capex_col_name = resolve_capex_column(cashflow, &opts.capex_candidates)?;
    debug!(column = capex_col_name, "resolved CapEx column");

    let income_by_key = index_income(income, opts.include_income_details)?;

    let cf_ticker = cashflow.require_column(TICKER)?;
    let cf_date = cashflow.require_column(REPORT_DATE)?;
    let cf_ocf = cashflow.require_column(OPERATING_CASH_FLOW)?;
    let cf_capex = cashflow.require_column(capex_col_name)?;

    let mut undated = 0usize;
    let mut records = Vec::new();

    for row in 0..cashflow.len() {
        let Some(ticker) = cashflow.text(row, cf_ticker) else {
            continue;
        };
        let Some(report_date) = cashflow.try_date(row, cf_date) else {
            undated += 1;
            continue;
        };
        if report_date.year() < opts.start_year {
            continue;
        }
        let Some(inc) = income_by_key.get(&(ticker.to_string(), report_date)).copied() else {
            continue;
        };

        records.push(FundamentalRecord {
            ticker: ticker.to_string(),
            report_date,
            operating_cash_flow: cashflow.f64(row, cf_ocf)?,
            capital_expenditure: cashflow.f64(row, cf_capex)?,
            shares_basic: inc.shares_basic,
            revenue: inc.revenue,
            net_income: inc.net_income,
        });
    }

    if undated > 0 {
        warn!(undated, "cash-flow rows without a usable report date; skipped");
    }

    // Stable sort: among equal keys, file order survives and dedup keeps the first.
    records.sort_by(|a, b| {
        a.ticker
            .cmp(&b.ticker)
            .then(a.report_date.cmp(&b.report_date))
    });
    let before = records.len();
    records.dedup_by(|later, kept| later.ticker == kept.ticker && later.report_date == kept.report_date);
    let duplicates = before - records.len();
    if duplicates > 0 {
        warn!(duplicates, "duplicate (ticker, report date) keys in cash-flow table; kept first");
    }

    let mut rows: Vec<FundamentalRow> = records.into_iter().map(FundamentalRow::new).collect();
    apply_grouped_growth(
        &mut rows,
        &opts.windows,
        |r| r.ticker(),
        |r| r.fcf_per_share,
        |r| &mut r.fcf_ps_growth,
    );

    Ok(rows)
}

fn index_income(
    income: &RawTable,
    include_details: bool,
) -> Result<HashMap<Key, IncomeFields>, FundamentalsError> {
    let ticker_col = income.require_column(TICKER)?;
    let date_col = income.require_column(REPORT_DATE)?;
    let shares_col = income.require_column(SHARES_BASIC)?;
    let (revenue_col, net_income_col) = if include_details {
        (
            Some(income.require_column(REVENUE)?),
            Some(income.require_column(NET_INCOME)?),
        )
    } else {
        (None, None)
    };

    let read = |row: usize, col: Option<usize>| -> Result<Option<f64>, DataError> {
        match col {
            Some(c) => income.f64(row, c),
            None => Ok(None),
        }
    };

    let mut by_key = HashMap::with_capacity(income.len());
    let mut duplicates = 0usize;
    let mut undated = 0usize;
    for row in 0..income.len() {
        let Some(ticker) = income.text(row, ticker_col) else {
            continue;
        };
        let Some(report_date) = income.try_date(row, date_col) else {
            undated += 1;
            continue;
        };
        let key = (ticker.to_string(), report_date);
        match by_key.entry(key) {
            Entry::Occupied(_) => duplicates += 1,
            Entry::Vacant(slot) => {
                slot.insert(IncomeFields {
                    shares_basic: income.f64(row, shares_col)?,
                    revenue: read(row, revenue_col)?,
                    net_income: read(row, net_income_col)?,
                });
            }
        }
    }

    if undated > 0 {
        warn!(undated, "income rows without a usable report date; skipped");
    }
    if duplicates > 0 {
        warn!(duplicates, "duplicate (ticker, report date) keys in income table; kept first");
    }
    Ok(by_key)
}
