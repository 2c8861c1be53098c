//! Output schema contract.
//!
//! Two fixed layouts share one pipeline:
//! - `basic`: price, market cap and FCF figures with 1Y/2Y growth, 6 decimals
//! - `extended`: adds revenue and net income, 6M/1Y/2Y/3Y growth, 3 decimals
//!
//! Column order and header text are part of the contract; downstream
//! consumers read these files by header name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{DatasetRow, GrowthWindow};

/// Selectable output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    #[default]
    Basic,
    Extended,
}

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ticker,
    ReportDate,
    Price,
    PriceGrowth(GrowthWindow),
    MarketCap,
    Revenue,
    NetIncome,
    Fcf,
    FcfPerShare,
    FcfPsGrowth(GrowthWindow),
}

/// A named output column.
#[derive(Debug, Clone, Copy)]
pub struct OutputColumn {
    pub header: &'static str,
    pub field: Field,
}

const fn col(header: &'static str, field: Field) -> OutputColumn {
    OutputColumn { header, field }
}

const BASIC_COLUMNS: &[OutputColumn] = &[
    col("Ticker", Field::Ticker),
    col("Report Date", Field::ReportDate),
    col("Price", Field::Price),
    col("YoY_Price_growth", Field::PriceGrowth(GrowthWindow::ONE_YEAR)),
    col("YoY2_Price_growth", Field::PriceGrowth(GrowthWindow::TWO_YEARS)),
    col("Market_Cap", Field::MarketCap),
    col("FCF", Field::Fcf),
    col("FCF_per_share", Field::FcfPerShare),
    col("YoY_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::ONE_YEAR)),
    col("YoY2_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::TWO_YEARS)),
];

const EXTENDED_COLUMNS: &[OutputColumn] = &[
    col("Ticker", Field::Ticker),
    col("Report Date", Field::ReportDate),
    col("Price", Field::Price),
    col("6M_Price_growth", Field::PriceGrowth(GrowthWindow::SIX_MONTHS)),
    col("1Y_Price_growth", Field::PriceGrowth(GrowthWindow::ONE_YEAR)),
    col("2Y_Price_growth", Field::PriceGrowth(GrowthWindow::TWO_YEARS)),
    col("3Y_Price_growth", Field::PriceGrowth(GrowthWindow::THREE_YEARS)),
    col("Market_Cap", Field::MarketCap),
    col("Revenue", Field::Revenue),
    col("Net Income", Field::NetIncome),
    col("FCF", Field::Fcf),
    col("FCF_per_share", Field::FcfPerShare),
    col("Yo6M_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::SIX_MONTHS)),
    col("1Y_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::ONE_YEAR)),
    col("2Y_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::TWO_YEARS)),
    col("3Y_FCFps_growth", Field::FcfPsGrowth(GrowthWindow::THREE_YEARS)),
];

const BASIC_WINDOWS: &[GrowthWindow] = &[GrowthWindow::ONE_YEAR, GrowthWindow::TWO_YEARS];

const EXTENDED_WINDOWS: &[GrowthWindow] = &[
    GrowthWindow::SIX_MONTHS,
    GrowthWindow::ONE_YEAR,
    GrowthWindow::TWO_YEARS,
    GrowthWindow::THREE_YEARS,
];

impl OutputSchema {
    pub fn name(self) -> &'static str {
        match self {
            OutputSchema::Basic => "basic",
            OutputSchema::Extended => "extended",
        }
    }

    pub fn columns(self) -> &'static [OutputColumn] {
        match self {
            OutputSchema::Basic => BASIC_COLUMNS,
            OutputSchema::Extended => EXTENDED_COLUMNS,
        }
    }

    pub fn headers(self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.header).collect()
    }

    /// Growth windows used for both FCF-per-share and price growth.
    pub fn windows(self) -> &'static [GrowthWindow] {
        match self {
            OutputSchema::Basic => BASIC_WINDOWS,
            OutputSchema::Extended => EXTENDED_WINDOWS,
        }
    }

    /// Decimal places for every float column.
    pub fn float_precision(self) -> usize {
        match self {
            OutputSchema::Basic => 6,
            OutputSchema::Extended => 3,
        }
    }

    /// Whether Revenue and Net Income must be read from the income table.
    pub fn needs_income_details(self) -> bool {
        self.columns()
            .iter()
            .any(|c| matches!(c.field, Field::Revenue | Field::NetIncome))
    }
}

impl fmt::Display for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(OutputSchema::Basic),
            "extended" => Ok(OutputSchema::Extended),
            other => Err(format!("unknown schema '{other}'. Valid: basic, extended")),
        }
    }
}

/// A single cell before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Date(NaiveDate),
    Number(Option<f64>),
}

impl Cell<'_> {
    /// Render for CSV. Undefined numbers become empty cells.
    pub fn render(&self, precision: usize) -> String {
        match self {
            Cell::Text(s) => (*s).to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Number(Some(v)) => format!("{v:.precision$}"),
            Cell::Number(None) => String::new(),
        }
    }
}

impl Field {
    /// Pull this field out of a finished row.
    pub fn value<'a>(&self, row: &'a DatasetRow) -> Cell<'a> {
        let f = row.fundamentals();
        match *self {
            Field::Ticker => Cell::Text(row.ticker()),
            Field::ReportDate => Cell::Date(row.report_date()),
            Field::Price => Cell::Number(Some(row.price())),
            Field::PriceGrowth(w) => Cell::Number(row.price_growth.get(w)),
            Field::MarketCap => Cell::Number(row.market_cap),
            Field::Revenue => Cell::Number(f.record.revenue),
            Field::NetIncome => Cell::Number(f.record.net_income),
            Field::Fcf => Cell::Number(f.fcf),
            Field::FcfPerShare => Cell::Number(f.fcf_per_share),
            Field::FcfPsGrowth(w) => Cell::Number(f.fcf_ps_growth.get(w)),
        }
    }
}
