//! Trailing growth over per-ticker ordered sequences.
//!
//! Rows arrive sorted by (ticker, report date). Each ticker is a contiguous
//! span, and growth at position `i` with lag `L` compares against position
//! `i - L` inside the same span only.

use std::ops::Range;

use crate::domain::{GrowthRatios, GrowthWindow};

/// `(current - base) / base`, undefined for missing inputs, a zero base, or
/// a non-finite result.
pub fn growth_ratio(current: Option<f64>, base: Option<f64>) -> Option<f64> {
    let (current, base) = (current?, base?);
    if base == 0.0 {
        return None;
    }
    let ratio = (current - base) / base;
    ratio.is_finite().then_some(ratio)
}

/// Growth of each value against the value `lag` positions earlier.
///
/// The first `lag` entries have no base and are `None`.
pub fn trailing_growth(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            i.checked_sub(lag)
                .and_then(|j| growth_ratio(current, values[j]))
        })
        .collect()
}

/// Index ranges of consecutive items sharing the same ticker.
pub fn ticker_spans<T>(items: &[T], ticker: impl Fn(&T) -> &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for i in 1..=items.len() {
        if i == items.len() || ticker(&items[i]) != ticker(&items[start]) {
            if start < i {
                spans.push(start..i);
            }
            start = i;
        }
    }
    spans
}

/// Fill one [`GrowthRatios`] per item, per window, ticker by ticker.
///
/// `items` must already be grouped by ticker and ordered by date inside each
/// group.
pub fn apply_grouped_growth<T>(
    items: &mut [T],
    windows: &[GrowthWindow],
    ticker: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> Option<f64>,
    ratios: impl Fn(&mut T) -> &mut GrowthRatios,
) {
    for span in ticker_spans(items, &ticker) {
        let group = &mut items[span];
        let values: Vec<Option<f64>> = group.iter().map(&value).collect();
        for &window in windows {
            let growth = trailing_growth(&values, window.lag());
            for (item, g) in group.iter_mut().zip(growth) {
                ratios(item).insert(window, g);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn one_year_growth_on_fifth_quarter() {
        let fcfps = [Some(1.0), Some(1.1), Some(1.21), Some(1.33), Some(1.46)];
        let g = trailing_growth(&fcfps, 4);
        assert!(g[..4].iter().all(Option::is_none));
        assert!(approx(g[4], 0.46));
    }

    #[test]
    fn zero_or_missing_base_is_undefined() {
        assert_eq!(growth_ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(growth_ratio(Some(1.0), None), None);
        assert_eq!(growth_ratio(None, Some(2.0)), None);
        assert!(approx(growth_ratio(Some(-1.0), Some(2.0)), -1.5));
    }

    #[test]
    fn lag_longer_than_series_is_all_undefined() {
        let g = trailing_growth(&[Some(1.0), Some(2.0)], 12);
        assert_eq!(g, vec![None, None]);
    }

    #[test]
    fn spans_split_on_ticker_change() {
        let items = ["A", "A", "B", "C", "C", "C"];
        let spans = ticker_spans(&items, |s| *s);
        assert_eq!(spans, vec![0..2, 2..3, 3..6]);
        assert!(ticker_spans::<&str>(&[], |s| *s).is_empty());
    }

    #[test]
    fn grouped_growth_never_crosses_tickers() {
        struct Row {
            ticker: &'static str,
            value: f64,
            growth: GrowthRatios,
        }
        let mut rows: Vec<Row> = [("A", 1.0), ("A", 2.0), ("B", 10.0), ("B", 15.0)]
            .into_iter()
            .map(|(ticker, value)| Row {
                ticker,
                value,
                growth: GrowthRatios::new(),
            })
            .collect();

        apply_grouped_growth(
            &mut rows,
            &[GrowthWindow(1)],
            |r| r.ticker,
            |r| Some(r.value),
            |r| &mut r.growth,
        );

        assert_eq!(rows[0].growth.get(GrowthWindow(1)), None);
        assert!(approx(rows[1].growth.get(GrowthWindow(1)), 1.0));
        // First B row must not look back into A.
        assert_eq!(rows[2].growth.get(GrowthWindow(1)), None);
        assert!(approx(rows[3].growth.get(GrowthWindow(1)), 0.5));
    }
}
