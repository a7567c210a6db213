//! Domain models for the Starload pipeline.
//!
//! - [`Table`] - named, row-oriented tabular value with ordered columns
//! - [`add_surrogate_key`] - dense 1..N key assignment
//! - [`RawSources`] - the five raw extracts handed to the builders
//! - [`StarSchema`] - the five curated tables handed to the quality gate and loader
//!
//! Cells are `serde_json::Value`; `Value::Null` is the missing value.

use serde::Serialize;
use serde_json::Value;

use crate::error::{TransformError, TransformResult};

// =============================================================================
// Table
// =============================================================================

/// An immutable-by-contract tabular snapshot.
///
/// Builders take `&Table` and return a freshly allocated `Table`; nothing
/// in the crate mutates a table it did not create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column layout.
    pub fn new<S: Into<String>>(name: impl Into<String>, columns: Vec<S>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from string rows. Empty strings become `Null`.
    ///
    /// Mostly useful for tests and small reference tables.
    pub fn from_text_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> TransformResult<Self> {
        let mut table = Self::new(name, columns.to_vec());
        for row in rows {
            table.push_row(row.iter().map(|s| text_cell(s)).collect())?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Position of a column the caller cannot work without.
    pub fn require_column(&self, column: &str) -> TransformResult<usize> {
        self.column_index(column)
            .ok_or_else(|| TransformError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Iterate over every value of a column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Cell at `row` / `column`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Append a row. Its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> TransformResult<()> {
        if row.len() != self.columns.len() {
            return Err(TransformError::RowWidth {
                table: self.name.clone(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }
}

/// Convert raw text to a cell: empty means missing.
pub fn text_cell(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        Value::String(raw.to_string())
    }
}

// =============================================================================
// Surrogate Keys
// =============================================================================

/// Insert `key_name` as the first column, numbered 1..=N by row position.
///
/// Takes the table by value: callers finish every filter, sort and
/// deduplication first, so the numbering matches the final row order.
pub fn add_surrogate_key(table: Table, key_name: &str) -> Table {
    let Table { name, columns, rows } = table;

    let mut keyed_columns = Vec::with_capacity(columns.len() + 1);
    keyed_columns.push(key_name.to_string());
    keyed_columns.extend(columns);

    let keyed_rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut keyed = Vec::with_capacity(row.len() + 1);
            keyed.push(Value::from(i as i64 + 1));
            keyed.extend(row);
            keyed
        })
        .collect();

    Table {
        name,
        columns: keyed_columns,
        rows: keyed_rows,
    }
}

// =============================================================================
// Raw Sources
// =============================================================================

/// The raw extracts, one table per source file.
#[derive(Debug, Clone)]
pub struct RawSources {
    pub customers: Table,
    pub products: Table,
    pub stores: Table,
    pub sales: Table,
    pub calendar: Table,
}

impl RawSources {
    /// Row counts keyed by source name, in extraction order.
    pub fn row_counts(&self) -> Vec<(String, usize)> {
        [&self.customers, &self.products, &self.stores, &self.sales, &self.calendar]
            .iter()
            .map(|t| (t.name().to_string(), t.len()))
            .collect()
    }
}

// =============================================================================
// Star Schema
// =============================================================================

/// Curated table names, in load order.
pub const CURATED_TABLES: [&str; 5] = [
    "dim_customer",
    "dim_product",
    "dim_store",
    "dim_date",
    "fact_sales",
];

/// Output of the transform stage: four dimensions and the sales fact.
#[derive(Debug, Clone)]
pub struct StarSchema {
    pub dim_customer: Table,
    pub dim_product: Table,
    pub dim_store: Table,
    pub dim_date: Table,
    pub fact_sales: Table,
}

impl StarSchema {
    /// Look a curated table up by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        match name {
            "dim_customer" => Some(&self.dim_customer),
            "dim_product" => Some(&self.dim_product),
            "dim_store" => Some(&self.dim_store),
            "dim_date" => Some(&self.dim_date),
            "fact_sales" => Some(&self.fact_sales),
            _ => None,
        }
    }

    /// `(name, table)` pairs in [`CURATED_TABLES`] order.
    pub fn tables(&self) -> [(&'static str, &Table); 5] {
        [
            (CURATED_TABLES[0], &self.dim_customer),
            (CURATED_TABLES[1], &self.dim_product),
            (CURATED_TABLES[2], &self.dim_store),
            (CURATED_TABLES[3], &self.dim_date),
            (CURATED_TABLES[4], &self.fact_sales),
        ]
    }
}

// =============================================================================
// Tests
// =============================================================================
