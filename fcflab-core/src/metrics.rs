//! Metrics finalizer: market cap and trailing price growth.

use crate::domain::{AlignedRecord, DatasetRow, GrowthRatios, GrowthWindow};
use crate::growth::apply_grouped_growth;

/// Price × basic shares.
pub fn market_cap(price: f64, shares_basic: Option<f64>) -> Option<f64> {
    let cap = price * shares_basic?;
    cap.is_finite().then_some(cap)
}

/// Turn aligned records into output rows.
///
/// `aligned` must be grouped by ticker and date-ordered within each ticker
/// (the aligner preserves the builder's order). Price growth lags count the
/// retained rows of each ticker.
pub fn finalize(aligned: Vec<AlignedRecord>, windows: &[GrowthWindow]) -> Vec<DatasetRow> {
    let mut rows: Vec<DatasetRow> = aligned
        .into_iter()
        .map(|a| DatasetRow {
            market_cap: market_cap(a.price, a.fundamentals.record.shares_basic),
            aligned: a,
            price_growth: GrowthRatios::new(),
        })
        .collect();

    apply_grouped_growth(
        &mut rows,
        windows,
        |r| r.ticker(),
        |r| Some(r.price()),
        |r| &mut r.price_growth,
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FundamentalRecord, FundamentalRow};
    use chrono::NaiveDate;

    fn aligned(ticker: &str, month: u32, price: f64, shares: Option<f64>) -> AlignedRecord {
        let date = NaiveDate::from_ymd_opt(2021, month, 1).unwrap();
        AlignedRecord {
            fundamentals: FundamentalRow::new(FundamentalRecord {
                ticker: ticker.into(),
                report_date: date,
                operating_cash_flow: None,
                capital_expenditure: None,
                shares_basic: shares,
                revenue: None,
                net_income: None,
            }),
            trade_date: date,
            price,
        }
    }

    #[test]
    fn market_cap_is_price_times_shares() {
        let rows = finalize(vec![aligned("A", 1, 12.5, Some(4.0))], &[]);
        assert_eq!(rows[0].market_cap, Some(50.0));
    }

    #[test]
    fn market_cap_undefined_without_shares() {
        let rows = finalize(vec![aligned("A", 1, 12.5, None)], &[]);
        assert_eq!(rows[0].market_cap, None);
    }

    #[test]
    fn price_growth_per_ticker() {
        let input = vec![
            aligned("A", 1, 10.0, Some(1.0)),
            aligned("A", 2, 12.0, Some(1.0)),
            aligned("A", 3, 15.0, Some(1.0)),
            aligned("B", 1, 100.0, Some(1.0)),
            aligned("B", 2, 50.0, Some(1.0)),
        ];
        let rows = finalize(input, &[GrowthWindow(2), GrowthWindow(1)]);

        assert_eq!(rows[0].price_growth.get(GrowthWindow(1)), None);
        assert!((rows[1].price_growth.get(GrowthWindow(1)).unwrap() - 0.2).abs() < 1e-12);
        assert!((rows[2].price_growth.get(GrowthWindow(2)).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(rows[3].price_growth.get(GrowthWindow(1)), None);
        assert!((rows[4].price_growth.get(GrowthWindow(1)).unwrap() + 0.5).abs() < 1e-12);
        assert_eq!(rows[4].price_growth.get(GrowthWindow(2)), None);
    }
}
