//! Typed access to raw cells.
//!
//! Raw extracts are all text; builders go through these helpers so every
//! malformed or missing value surfaces as a [`TransformError`] carrying the
//! table, column and 1-based row.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::error::{TransformError, TransformResult};
use crate::models::Table;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Output format for date cells.
pub const DATE_OUTPUT: &str = "%Y-%m-%d";

/// Output format for timestamp cells.
pub const TIMESTAMP_OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a date, also accepting a full timestamp (its date part is kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date()))
}

/// Parse a timestamp, also accepting a bare date (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `YYYYMMDD` integer key of a date.
pub fn date_key(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Round to two decimals, exact cent ties going to the even cent.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Text of a natural-key cell. `Null` never matches anything.
///
/// Codes compare as exact text: `7`, `07` and `7.0` are different keys.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Column-bound reader over one table.
///
/// Resolves the column once and reports errors against it.
pub struct ColumnReader<'a> {
    table: &'a Table,
    column: &'a str,
    index: usize,
}

impl<'a> ColumnReader<'a> {
    pub fn new(table: &'a Table, column: &'a str) -> TransformResult<Self> {
        let index = table.require_column(column)?;
        Ok(Self { table, column, index })
    }

    /// Raw cell of row `row` (0-based).
    pub fn raw(&self, row: usize) -> &'a Value {
        &self.table.rows()[row][self.index]
    }

    fn missing(&self, row: usize) -> TransformError {
        TransformError::MissingValue {
            table: self.table.name().to_string(),
            column: self.column.to_string(),
            row: row + 1,
        }
    }

    fn invalid_date(&self, row: usize, value: String) -> TransformError {
        TransformError::InvalidDate {
            table: self.table.name().to_string(),
            column: self.column.to_string(),
            row: row + 1,
            value,
        }
    }

    fn invalid_number(&self, row: usize, value: String) -> TransformError {
        TransformError::InvalidNumber {
            table: self.table.name().to_string(),
            column: self.column.to_string(),
            row: row + 1,
            value,
        }
    }

    /// Required timestamp.
    pub fn timestamp(&self, row: usize) -> TransformResult<NaiveDateTime> {
        let text = key_text(self.raw(row)).ok_or_else(|| self.missing(row))?;
        parse_timestamp(&text).ok_or_else(|| self.invalid_date(row, text))
    }

    /// Required date.
    pub fn date(&self, row: usize) -> TransformResult<NaiveDate> {
        let text = key_text(self.raw(row)).ok_or_else(|| self.missing(row))?;
        parse_date(&text).ok_or_else(|| self.invalid_date(row, text))
    }

    /// Optional date, normalized to [`DATE_OUTPUT`] text.
    pub fn optional_date_cell(&self, row: usize) -> TransformResult<Value> {
        match self.raw(row) {
            Value::Null => Ok(Value::Null),
            _ => Ok(Value::String(self.date(row)?.format(DATE_OUTPUT).to_string())),
        }
    }

    /// Required number as `f64`.
    pub fn number(&self, row: usize) -> TransformResult<f64> {
        match self.raw(row) {
            Value::Null => Err(self.missing(row)),
            Value::Number(n) => n.as_f64().ok_or_else(|| self.invalid_number(row, n.to_string())),
            other => {
                let text = key_text(other).unwrap_or_default();
                match text.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(self.invalid_number(row, text)),
                }
            }
        }
    }

    /// Required integer.
    pub fn integer(&self, row: usize) -> TransformResult<i64> {
        match self.raw(row) {
            Value::Null => Err(self.missing(row)),
            Value::Number(n) => n.as_i64().ok_or_else(|| self.invalid_number(row, n.to_string())),
            other => {
                let text = key_text(other).unwrap_or_default();
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| {
                        // "3.0" from spreadsheet exports
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .filter(|f| f.fract() == 0.0 && f.is_finite())
                            .map(|f| f as i64)
                    })
                    .ok_or_else(|| self.invalid_number(row, text))
            }
        }
    }

    /// Numeric cell keeping integers as integers. `Null` stays `Null`.
    pub fn numeric_cell(&self, row: usize) -> TransformResult<Value> {
        let raw = self.raw(row);
        if raw.is_null() {
            return Ok(Value::Null);
        }
        if let Some(text) = raw.as_str() {
            if let Ok(i) = text.trim().parse::<i64>() {
                return Ok(Value::from(i));
            }
        } else if raw.is_i64() {
            return Ok(raw.clone());
        }
        float_cell(self.number(row)?).ok_or_else(|| self.invalid_number(row, raw.to_string()))
    }

    /// Required numeric cell.
    pub fn required_numeric_cell(&self, row: usize) -> TransformResult<Value> {
        if self.raw(row).is_null() {
            return Err(self.missing(row));
        }
        self.numeric_cell(row)
    }

    /// 0/1 flag from `0`, `1`, `true`, `false` (any case).
    pub fn flag(&self, row: usize) -> TransformResult<i64> {
        let value = self.raw(row);
        match value {
            Value::Null => Err(self.missing(row)),
            Value::Bool(b) => Ok(i64::from(*b)),
            _ => {
                let text = key_text(value).unwrap_or_default();
                match text.trim().to_lowercase().as_str() {
                    "1" | "1.0" | "true" => Ok(1),
                    "0" | "0.0" | "false" => Ok(0),
                    _ => Err(self.invalid_number(row, text)),
                }
            }
        }
    }
}

/// JSON cell for a finite float.
pub fn float_cell(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_text_rows("sales", &["value"], rows).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00.000"), Some(expected));
        assert!(parse_timestamp("2024-03-05").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_date_accepts_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date("05/03/2024"), expected);
        assert_eq!(parse_date("2024-03-05 08:00:00"), expected);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()), 20240109);
        assert_eq!(date_key(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()), 19991231);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.0 * 4.995), 9.99);
        assert_eq!(round2(10.0 - 0.0), 10.0);
        assert_eq!(round2(3.14159), 3.14);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(1.125), 1.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-1.125), -1.12);
    }

    #[test]
    fn test_missing_and_invalid_numbers() {
        let t = table(&[&["12.5"], &[""], &["abc"]]);
        let reader = ColumnReader::new(&t, "value").unwrap();

        assert_eq!(reader.number(0).unwrap(), 12.5);
        assert!(matches!(reader.number(1), Err(TransformError::MissingValue { row: 2, .. })));
        assert!(matches!(reader.number(2), Err(TransformError::InvalidNumber { row: 3, .. })));
    }

    #[test]
    fn test_numeric_cell_keeps_integers() {
        let t = table(&[&["3"], &["2.50"], &[""]]);
        let reader = ColumnReader::new(&t, "value").unwrap();

        assert_eq!(reader.numeric_cell(0).unwrap(), json!(3));
        assert_eq!(reader.numeric_cell(1).unwrap(), json!(2.5));
        assert_eq!(reader.numeric_cell(2).unwrap(), Value::Null);
        assert!(reader.required_numeric_cell(2).is_err());
    }

    #[test]
    fn test_flag_values() {
        let t = table(&[&["1"], &["False"], &["TRUE"], &["maybe"]]);
        let reader = ColumnReader::new(&t, "value").unwrap();

        assert_eq!(reader.flag(0).unwrap(), 1);
        assert_eq!(reader.flag(1).unwrap(), 0);
        assert_eq!(reader.flag(2).unwrap(), 1);
        assert!(reader.flag(3).is_err());
    }

    #[test]
    fn test_optional_date_cell() {
        let t = table(&[&["2023/07/01"], &[""], &["soon"]]);
        let reader = ColumnReader::new(&t, "value").unwrap();

        assert_eq!(reader.optional_date_cell(0).unwrap(), json!("2023-07-01"));
        assert_eq!(reader.optional_date_cell(1).unwrap(), Value::Null);
        assert!(matches!(
            reader.optional_date_cell(2),
            Err(TransformError::InvalidDate { ref value, .. }) if value == "soon"
        ));
    }

    #[test]
    fn test_missing_column() {
        let t = table(&[&["1"]]);
        assert!(ColumnReader::new(&t, "quantity").is_err());
    }
}
