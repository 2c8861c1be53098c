//! Report-date to trade-date alignment.
//!
//! Each fundamentals row takes the first trade on or after its report date,
//! provided that trade falls within `window_days` calendar days. Rows with no
//! such trade are dropped; there is no backward fill and no stale price.

use chrono::{Duration, NaiveDate};

use crate::domain::{AlignedRecord, FundamentalRow, PriceBook, PricePoint};

/// Default forward window, in calendar days.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Earliest point with `report_date <= trade_date <= report_date + window_days`.
///
/// `series` must be sorted ascending by trade date. Duplicate timestamps
/// resolve to the first one in series order.
pub fn find_aligned_price(
    series: &[PricePoint],
    report_date: NaiveDate,
    window_days: i64,
) -> Option<&PricePoint> {
    let first = series.partition_point(|p| p.trade_date < report_date);
    let candidate = series.get(first)?;
    let in_window = match Duration::try_days(window_days)
        .and_then(|w| report_date.checked_add_signed(w))
    {
        Some(last_allowed) => candidate.trade_date <= last_allowed,
        // The bound lies outside the calendar: unbounded ahead, empty behind.
        None => window_days > 0,
    };
    in_window.then_some(candidate)
}

/// Outcome of aligning a batch of fundamentals rows.
#[derive(Debug, Default)]
pub struct Alignment {
    pub aligned: Vec<AlignedRecord>,
    /// Rows that had no trade inside their window.
    pub unmatched: usize,
}

/// Join every row to its aligned price, keeping input order.
pub fn align_prices(rows: Vec<FundamentalRow>, prices: &PriceBook, window_days: i64) -> Alignment {
    let mut out = Alignment {
        aligned: Vec::with_capacity(rows.len()),
        unmatched: 0,
    };

    for row in rows {
        let series = prices.series(row.ticker());
        match find_aligned_price(series, row.report_date(), window_days) {
            Some(point) => {
                let (trade_date, price) = (point.trade_date, point.price);
                out.aligned.push(AlignedRecord {
                    fundamentals: row,
                    trade_date,
                    price,
                });
            }
            None => out.unmatched += 1,
        }
    }

    out
}
