//! Date dimension.
//!
//! The reference calendar may be incomplete, so every calendar day a sale
//! happened on is synthesized and appended after the reference rows. Rows
//! are then deduplicated on `date_key` (first occurrence wins, so reference
//! data takes precedence), sorted ascending and numbered.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::Value;

use super::values::{date_key, ColumnReader, DATE_OUTPUT};
use crate::error::TransformResult;
use crate::models::{add_surrogate_key, Table};

/// Month names used for synthesized calendar rows, January first.
pub const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Columns of `dim_date` after the surrogate key.
pub const DATE_COLUMNS: [&str; 8] = [
    "date_key",
    "full_date",
    "day",
    "month",
    "month_name",
    "quarter",
    "year",
    "is_weekend",
];

/// One calendar row before key assignment.
#[derive(Debug, Clone)]
struct CalendarRow {
    date_key: i64,
    cells: Vec<Value>,
}

/// Calendar attributes for a date that only appears in transactions.
fn synthesize(date: NaiveDate) -> CalendarRow {
    let month = date.month();
    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    let key = date_key(date);

    CalendarRow {
        date_key: key,
        cells: vec![
            Value::from(key),
            Value::String(date.format(DATE_OUTPUT).to_string()),
            Value::from(date.day()),
            Value::from(month),
            Value::String(MONTH_NAMES_PT[(month - 1) as usize].to_string()),
            Value::from(1 + (month - 1) / 3),
            Value::from(date.year()),
            Value::from(i64::from(weekend)),
        ],
    }
}

/// Typed copy of the reference calendar, in file order.
fn reference_rows(calendar: &Table) -> TransformResult<Vec<CalendarRow>> {
    let key = ColumnReader::new(calendar, "date_key")?;
    let full_date = ColumnReader::new(calendar, "full_date")?;
    let day = ColumnReader::new(calendar, "day")?;
    let month = ColumnReader::new(calendar, "month")?;
    let month_name = ColumnReader::new(calendar, "month_name")?;
    let quarter = ColumnReader::new(calendar, "quarter")?;
    let year = ColumnReader::new(calendar, "year")?;
    let weekend = ColumnReader::new(calendar, "is_weekend")?;

    (0..calendar.len())
        .map(|i| {
            let date_key = key.integer(i)?;
            Ok(CalendarRow {
                date_key,
                cells: vec![
                    Value::from(date_key),
                    Value::String(full_date.date(i)?.format(DATE_OUTPUT).to_string()),
                    Value::from(day.integer(i)?),
                    Value::from(month.integer(i)?),
                    month_name.raw(i).clone(),
                    Value::from(quarter.integer(i)?),
                    Value::from(year.integer(i)?),
                    Value::from(weekend.flag(i)?),
                ],
            })
        })
        .collect()
}

/// Distinct transaction dates, in order of first appearance.
fn sales_dates(sales: &Table) -> TransformResult<Vec<NaiveDate>> {
    let order = ColumnReader::new(sales, "order_datetime")?;
    let mut seen = HashSet::new();
    let mut dates = Vec::new();

    for i in 0..sales.len() {
        let date = order.timestamp(i)?.date();
        if seen.insert(date) {
            dates.push(date);
        }
    }
    Ok(dates)
}

/// Build `dim_date` from the reference calendar and the sales extract.
///
/// Every date present in `sales.order_datetime` is covered, `date_key` is
/// strictly increasing by row and `date_sk` runs 1..N in that order.
pub fn build_dim_date(calendar: &Table, sales: &Table) -> TransformResult<Table> {
    let mut rows = reference_rows(calendar)?;
    rows.extend(sales_dates(sales)?.into_iter().map(synthesize));

    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.date_key));
    rows.sort_by_key(|row| row.date_key);

    let mut dim = Table::new("dim_date", DATE_COLUMNS.to_vec());
    for row in rows {
        dim.push_row(row.cells)?;
    }

    Ok(add_surrogate_key(dim, "date_sk"))
}
