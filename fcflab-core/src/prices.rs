//! Price loader: daily adjusted closes from the share-price table.

use tracing::{debug, warn};

use crate::data::{DataError, RawTable};
use crate::domain::{PriceBook, PriceRecord};

pub const TICKER: &str = "Ticker";
pub const TRADE_DATE: &str = "Date";
pub const ADJ_CLOSE: &str = "Adj. Close";

/// Read `Ticker`, `Date` and `Adj. Close` into per-ticker sorted series.
///
/// Rows without a ticker or with a blank or non-finite close carry no
/// usable price and are skipped. Rows whose date is blank or malformed are
/// skipped with a warning.
pub fn load_price_book(table: &RawTable) -> Result<PriceBook, DataError> {
    let ticker_col = table.require_column(TICKER)?;
    let date_col = table.require_column(TRADE_DATE)?;
    let price_col = table.require_column(ADJ_CLOSE)?;

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    let mut undated = 0usize;
    for row in 0..table.len() {
        let (Some(ticker), Some(price)) = (table.text(row, ticker_col), table.f64(row, price_col)?)
        else {
            skipped += 1;
            continue;
        };
        if !price.is_finite() {
            skipped += 1;
            continue;
        }
        let Some(trade_date) = table.try_date(row, date_col) else {
            undated += 1;
            continue;
        };
        records.push(PriceRecord {
            ticker: ticker.to_string(),
            trade_date,
            price,
        });
    }

    if undated > 0 {
        warn!(undated, "price rows without a usable date; skipped");
    }
    if skipped > 0 {
        debug!(skipped, "price rows without a usable close");
    }
    Ok(PriceBook::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PROVIDER_DELIMITER;
    use chrono::NaiveDate;

    #[test]
    fn loads_and_sorts_adjusted_closes() {
        let csv = "Ticker;SimFinId;Date;Close;Adj. Close\n\
                   AAPL;1;2021-01-06;130;129.5\n\
                   AAPL;1;2021-01-05;131;130.5\n\
                   AAPL;1;2021-01-07;;\n\
                   MSFT;2;2021-01-05;217;NaN\n";
        let table = RawTable::from_csv("shareprices", csv, PROVIDER_DELIMITER).unwrap();
        let book = load_price_book(&table).unwrap();

        let aapl = book.series("AAPL");
        assert_eq!(aapl.len(), 2);
        assert_eq!(aapl[0].trade_date, NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
        assert_eq!(aapl[0].price, 130.5);
        assert!(book.series("MSFT").is_empty());
    }

    #[test]
    fn rows_with_unusable_dates_are_skipped() {
        let csv = "Ticker;Date;Adj. Close\n\
                   AAPL;2021-01-05;130\n\
                   AAPL;;131\n\
                   AAPL;05/01/2021;132\n";
        let table = RawTable::from_csv("shareprices", csv, PROVIDER_DELIMITER).unwrap();
        let book = load_price_book(&table).unwrap();
        assert_eq!(book.observation_count(), 1);
        assert_eq!(book.series("AAPL")[0].price, 130.0);
    }

    #[test]
    fn missing_adj_close_column_is_an_error() {
        let table =
            RawTable::from_csv("shareprices", "Ticker;Date;Close\n", PROVIDER_DELIMITER).unwrap();
        assert!(matches!(
            load_price_book(&table),
            Err(DataError::MissingColumn { .. })
        ));
    }
}
