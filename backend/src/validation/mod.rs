//! Data-quality checks for the star schema.
//!
//! Three reusable primitives each produce a [`QualityCheckResult`]:
//!
//! | Check                 | Fails when                                        |
//! |-----------------------|---------------------------------------------------|
//! | [`check_not_null`]    | any listed column holds a null                    |
//! | [`check_unique`]      | the column combination repeats                    |
//! | [`check_foreign_key`] | a child value is absent from the parent column    |
//!
//! [`ensure_quality`] turns a batch of results into a single fatal
//! [`QualityError`]. The rule set the pipeline runs lives in [`rules`].
//!
//! # Example
//!
//! ```rust,ignore
//! use starload::validation::{check_unique, ensure_quality};
//!
//! let result = check_unique(&dim_store, &["store_code"]);
//! ensure_quality(&[result])?;
//! ```

pub mod rules;

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QualityError;
use crate::models::Table;

pub use rules::{run_quality_checks, run_rules, star_schema_rules, QualityRule};

/// How many missing foreign keys a failing check reports.
pub const MAX_MISSING_EXAMPLES: usize = 5;

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheckResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl QualityCheckResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            details: None,
        }
    }

    pub fn fail(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            details: Some(details.into()),
        }
    }
}

/// Column indices of `table`, or the first missing column.
fn resolve_columns(table: &Table, columns: &[&str]) -> Result<Vec<usize>, String> {
    columns
        .iter()
        .map(|c| table.column_index(c).ok_or_else(|| format!("column not found: {}", c)))
        .collect()
}

/// Fail if any listed column holds a null anywhere in the table.
pub fn check_not_null(table: &Table, columns: &[&str]) -> QualityCheckResult {
    let name = format!("not_null:{}({})", table.name(), columns.join(", "));

    let indices = match resolve_columns(table, columns) {
        Ok(indices) => indices,
        Err(details) => return QualityCheckResult::fail(name, details),
    };

    let offending: Vec<String> = columns
        .iter()
        .zip(indices)
        .filter_map(|(column, idx)| {
            let nulls = table.rows().iter().filter(|row| row[idx].is_null()).count();
            (nulls > 0).then(|| format!("{}={}", column, nulls))
        })
        .collect();

    if offending.is_empty() {
        QualityCheckResult::pass(name)
    } else {
        QualityCheckResult::fail(name, format!("null values found: {}", offending.join(", ")))
    }
}

/// Fail if the combination of `columns` is not unique across rows.
///
/// Reports the number of rows repeating an earlier combination.
pub fn check_unique(table: &Table, columns: &[&str]) -> QualityCheckResult {
    let name = format!("unique:{}({})", table.name(), columns.join(", "));

    let indices = match resolve_columns(table, columns) {
        Ok(indices) => indices,
        Err(details) => return QualityCheckResult::fail(name, details),
    };

    let mut seen = HashSet::new();
    let duplicates = table
        .rows()
        .iter()
        .filter(|row| {
            let key: Vec<&Value> = indices.iter().map(|&i| &row[i]).collect();
            !seen.insert(serde_json::to_string(&key).unwrap_or_default())
        })
        .count();

    if duplicates == 0 {
        QualityCheckResult::pass(name)
    } else {
        QualityCheckResult::fail(name, format!("found {} duplicate rows", duplicates))
    }
}

/// Fail if a non-null value of `child_column` is absent from `parent_column`.
///
/// Reports up to [`MAX_MISSING_EXAMPLES`] missing values in ascending order.
pub fn check_foreign_key(
    child: &Table,
    parent: &Table,
    child_column: &str,
    parent_column: &str,
) -> QualityCheckResult {
    let name = format!(
        "fk:{}.{}->{}.{}",
        child.name(),
        child_column,
        parent.name(),
        parent_column
    );

    let (child_values, parent_values) = match (child.column_values(child_column), parent.column_values(parent_column)) {
        (Some(c), Some(p)) => (c, p),
        (None, _) => return QualityCheckResult::fail(name, format!("column not found: {}", child_column)),
        (_, None) => return QualityCheckResult::fail(name, format!("column not found: {}", parent_column)),
    };

    let parent_keys: HashSet<String> = parent_values.filter_map(canonical).collect();

    let mut missing: Vec<&Value> = Vec::new();
    let mut reported = HashSet::new();
    for value in child_values {
        if let Some(key) = canonical(value) {
            if !parent_keys.contains(&key) && reported.insert(key) {
                missing.push(value);
            }
        }
    }

    if missing.is_empty() {
        return QualityCheckResult::pass(name);
    }

    missing.sort_by(|a, b| compare_keys(a, b));
    let examples: Vec<String> = missing
        .iter()
        .take(MAX_MISSING_EXAMPLES)
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    QualityCheckResult::fail(name, format!("keys missing from parent: [{}]", examples.join(", ")))
}

/// Comparable identity of a key cell. Integral floats match integers.
fn canonical(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && n.is_f64() => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numbers ascending, then everything else by text.
fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => canonical(a).cmp(&canonical(b)),
    }
}

/// Fail with one aggregate error if any result failed. No-op otherwise.
pub fn ensure_quality(results: &[QualityCheckResult]) -> Result<(), QualityError> {
    let failures: Vec<QualityCheckResult> = results.iter().filter(|r| !r.passed).cloned().collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(QualityError { failures })
    }
}
