//! Raw provider tables.
//!
//! Provider CSVs have a schema that varies between releases (the CapEx column
//! in particular), so tables are kept as header + string records and typed
//! values are pulled out column by column.

use chrono::NaiveDate;

use super::provider::DataError;

/// Field separator used by the bulk CSV files.
pub const PROVIDER_DELIMITER: u8 = b';';

/// A parsed CSV table with named columns.
#[derive(Debug, Clone)]
pub struct RawTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl RawTable {
    /// Parse CSV text. `name` is only used in error messages.
    pub fn from_csv(name: &str, text: &str, delimiter: u8) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DataError::ResponseFormatChanged(format!("{name} header: {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataError::ResponseFormatChanged(format!("{name} rows: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, column: &str) -> Result<usize, DataError> {
        self.column_index(column)
            .ok_or_else(|| DataError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Trimmed cell text; blank and missing cells read as `None`.
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric cell. Blank cells are `None`; unparseable text is an error.
    pub fn f64(&self, row: usize, col: usize) -> Result<Option<f64>, DataError> {
        match self.text(row, col) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.bad_value(row, col, raw)),
        }
    }

    /// Required `YYYY-MM-DD` date cell.
    pub fn date(&self, row: usize, col: usize) -> Result<NaiveDate, DataError> {
        let raw = self
            .text(row, col)
            .ok_or_else(|| self.bad_value(row, col, ""))?;
        // Some exports carry a time component; only the date part matters.
        let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| self.bad_value(row, col, raw))
    }

    /// Like [`date`](Self::date), but blank or malformed cells read as `None`.
    pub fn try_date(&self, row: usize, col: usize) -> Option<NaiveDate> {
        self.date(row, col).ok()
    }

    fn bad_value(&self, row: usize, col: usize, value: &str) -> DataError {
        DataError::BadValue {
            table: self.name.clone(),
            column: self.headers.get(col).cloned().unwrap_or_default(),
            row,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}Ticker;Report Date;Revenue\nAAPL;2021-03-31;100.5\nMSFT;2021-03-31 00:00:00;\n";

    #[test]
    fn parses_headers_and_rows() {
        let t = RawTable::from_csv("income", SAMPLE, PROVIDER_DELIMITER).unwrap();
        assert_eq!(t.headers(), &["Ticker", "Report Date", "Revenue"]);
        assert_eq!(t.len(), 2);
        assert!(t.has_column("Revenue"));
        assert!(!t.has_column("Net Income"));
    }

    #[test]
    fn typed_cells() {
        let t = RawTable::from_csv("income", SAMPLE, PROVIDER_DELIMITER).unwrap();
        let rev = t.require_column("Revenue").unwrap();
        let date = t.require_column("Report Date").unwrap();
        assert_eq!(t.f64(0, rev).unwrap(), Some(100.5));
        assert_eq!(t.f64(1, rev).unwrap(), None);
        assert_eq!(
            t.date(1, date).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 31).unwrap()
        );
    }

    #[test]
    fn missing_column_names_table() {
        let t = RawTable::from_csv("income", SAMPLE, PROVIDER_DELIMITER).unwrap();
        let err = t.require_column("Shares (Basic)").unwrap_err();
        assert!(err.to_string().contains("Shares (Basic)"));
        assert!(err.to_string().contains("income"));
    }

    #[test]
    fn lenient_dates() {
        let t = RawTable::from_csv(
            "shareprices",
            "Ticker;Date\nA;2021-01-05\nB;\nC;not-a-date\n",
            PROVIDER_DELIMITER,
        )
        .unwrap();
        assert_eq!(t.try_date(0, 1), NaiveDate::from_ymd_opt(2021, 1, 5));
        assert_eq!(t.try_date(1, 1), None);
        assert_eq!(t.try_date(2, 1), None);
        assert!(matches!(t.date(2, 1), Err(DataError::BadValue { .. })));
    }

    #[test]
    fn unparseable_number_is_an_error() {
        let t = RawTable::from_csv("cashflow", "Ticker;OCF\nX;abc\n", PROVIDER_DELIMITER).unwrap();
        assert!(matches!(t.f64(0, 1), Err(DataError::BadValue { .. })));
    }
}
