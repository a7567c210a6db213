//! Declarative quality rules.
//!
//! A rule names its kind, the curated table(s) it targets and its columns.
//! [`run_rules`] evaluates any list of rules against a [`StarSchema`];
//! [`star_schema_rules`] is the fixed policy the pipeline enforces.
//!
//! Rules are plain data and (de)serialize as tagged JSON:
//!
//! ```json
//! { "type": "foreign_key", "child": "fact_sales", "parent": "dim_date",
//!   "child_column": "date_sk", "parent_column": "date_sk" }
//! ```

use serde::{Deserialize, Serialize};

use super::{check_foreign_key, check_not_null, check_unique, ensure_quality, QualityCheckResult};
use crate::error::QualityError;
use crate::models::StarSchema;

/// One quality rule over named curated tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QualityRule {
    /// No nulls in any of `columns`.
    NotNull { table: String, columns: Vec<String> },

    /// `columns` together identify a row.
    Unique { table: String, columns: Vec<String> },

    /// Every `child.child_column` value exists in `parent.parent_column`.
    ForeignKey {
        child: String,
        parent: String,
        child_column: String,
        parent_column: String,
    },
}

impl QualityRule {
    pub fn not_null(table: &str, columns: &[&str]) -> Self {
        Self::NotNull {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn unique(table: &str, columns: &[&str]) -> Self {
        Self::Unique {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn foreign_key(child: &str, parent: &str, child_column: &str, parent_column: &str) -> Self {
        Self::ForeignKey {
            child: child.to_string(),
            parent: parent.to_string(),
            child_column: child_column.to_string(),
            parent_column: parent_column.to_string(),
        }
    }

    /// Evaluate against `schema`. Unknown tables fail the rule.
    pub fn evaluate(&self, schema: &StarSchema) -> QualityCheckResult {
        match self {
            Self::NotNull { table, columns } => match schema.table(table) {
                Some(t) => check_not_null(t, &as_strs(columns)),
                None => missing_table(format!("not_null:{}({})", table, columns.join(", ")), table),
            },
            Self::Unique { table, columns } => match schema.table(table) {
                Some(t) => check_unique(t, &as_strs(columns)),
                None => missing_table(format!("unique:{}({})", table, columns.join(", ")), table),
            },
            Self::ForeignKey {
                child,
                parent,
                child_column,
                parent_column,
            } => {
                let name = format!("fk:{}.{}->{}.{}", child, child_column, parent, parent_column);
                match (schema.table(child), schema.table(parent)) {
                    (Some(c), Some(p)) => check_foreign_key(c, p, child_column, parent_column),
                    (None, _) => missing_table(name, child),
                    (_, None) => missing_table(name, parent),
                }
            }
        }
    }
}

fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

fn missing_table(name: String, table: &str) -> QualityCheckResult {
    QualityCheckResult::fail(name, format!("table not found: {}", table))
}

/// The rule set enforced on every run.
///
/// Natural keys unique per dimension, fact keys and timestamp not null,
/// fact surrogate keys resolvable in every dimension.
pub fn star_schema_rules() -> Vec<QualityRule> {
    vec![
        QualityRule::unique("dim_customer", &["customer_code"]),
        QualityRule::unique("dim_product", &["product_code"]),
        QualityRule::unique("dim_store", &["store_code"]),
        QualityRule::unique("dim_date", &["date_key"]),
        QualityRule::not_null(
            "fact_sales",
            &[
                "sale_id",
                "date_sk",
                "store_sk",
                "product_sk",
                "customer_sk",
                "order_datetime",
            ],
        ),
        QualityRule::foreign_key("fact_sales", "dim_customer", "customer_sk", "customer_sk"),
        QualityRule::foreign_key("fact_sales", "dim_product", "product_sk", "product_sk"),
        QualityRule::foreign_key("fact_sales", "dim_store", "store_sk", "store_sk"),
        QualityRule::foreign_key("fact_sales", "dim_date", "date_sk", "date_sk"),
    ]
}

/// Evaluate every rule, in order.
pub fn run_rules(schema: &StarSchema, rules: &[QualityRule]) -> Vec<QualityCheckResult> {
    rules.iter().map(|rule| rule.evaluate(schema)).collect()
}

/// Run [`star_schema_rules`] and fail on any violation.
///
/// Returns the (all passing) results so callers can report them.
pub fn run_quality_checks(schema: &StarSchema) -> Result<Vec<QualityCheckResult>, QualityError> {
    let results = run_rules(schema, &star_schema_rules());
    ensure_quality(&results)?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;
    use serde_json::{json, Value};

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut t = Table::new(name, columns.to_vec());
        for row in rows {
            t.push_row(row).unwrap();
        }
        t
    }

    fn schema() -> StarSchema {
        StarSchema {
            dim_customer: table(
                "dim_customer",
                &["customer_sk", "customer_code"],
                vec![vec![json!(1), json!("C1")], vec![json!(2), json!("C2")]],
            ),
            dim_product: table("dim_product", &["product_sk", "product_code"], vec![vec![json!(1), json!("P1")]]),
            dim_store: table("dim_store", &["store_sk", "store_code"], vec![vec![json!(1), json!("S1")]]),
            dim_date: table("dim_date", &["date_sk", "date_key"], vec![vec![json!(1), json!(20240301)]]),
            fact_sales: table(
                "fact_sales",
                &["sale_sk", "sale_id", "date_sk", "store_sk", "product_sk", "customer_sk", "order_datetime"],
                vec![
                    vec![json!(1), json!("1"), json!(1), json!(1), json!(1), json!(2), json!("2024-03-01 10:00:00")],
                    vec![json!(2), json!("2"), json!(1), json!(1), json!(1), json!(1), json!("2024-03-01 11:00:00")],
                ],
            ),
        }
    }

    #[test]
    fn test_valid_schema_passes() {
        let results = run_quality_checks(&schema()).unwrap();
        assert_eq!(results.len(), star_schema_rules().len());
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_injected_orphan_key_names_fk_check() {
        let mut s = schema();
        s.fact_sales = table(
            "fact_sales",
            &["sale_sk", "sale_id", "date_sk", "store_sk", "product_sk", "customer_sk", "order_datetime"],
            vec![vec![json!(1), json!("1"), json!(1), json!(1), json!(1), json!(99), json!("2024-03-01 10:00:00")]],
        );

        let err = run_quality_checks(&s).unwrap_err();
        assert_eq!(err.failed_names(), vec!["fk:fact_sales.customer_sk->dim_customer.customer_sk"]);
        let msg = err.to_string();
        assert!(msg.contains("fk:fact_sales.customer_sk->dim_customer.customer_sk"));
        assert!(msg.contains("[99]"));
    }

    #[test]
    fn test_duplicate_natural_key_and_null_fact_key_both_reported() {
        let mut s = schema();
        s.dim_store = table(
            "dim_store",
            &["store_sk", "store_code"],
            vec![vec![json!(1), json!("S1")], vec![json!(2), json!("S1")]],
        );
        s.fact_sales = table(
            "fact_sales",
            &["sale_sk", "sale_id", "date_sk", "store_sk", "product_sk", "customer_sk", "order_datetime"],
            vec![vec![json!(1), Value::Null, json!(1), json!(1), json!(1), json!(1), json!("2024-03-01 10:00:00")]],
        );

        let err = run_quality_checks(&s).unwrap_err();
        let names = err.failed_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "unique:dim_store(store_code)");
        assert!(names[1].starts_with("not_null:fact_sales("));
        assert!(err.to_string().contains("sale_id=1"));
    }

    #[test]
    fn test_unknown_table_fails_rule() {
        let results = run_rules(&schema(), &[QualityRule::unique("dim_weather", &["day"])]);
        assert!(!results[0].passed);
        assert_eq!(results[0].details.as_deref(), Some("table not found: dim_weather"));
    }

    #[test]
    fn test_rules_deserialize_from_json() {
        let rules: Vec<QualityRule> = serde_json::from_value(json!([
            { "type": "unique", "table": "dim_store", "columns": ["store_code"] },
            { "type": "foreign_key", "child": "fact_sales", "parent": "dim_date",
              "child_column": "date_sk", "parent_column": "date_sk" }
        ]))
        .unwrap();

        assert_eq!(rules[0], QualityRule::unique("dim_store", &["store_code"]));
        let results = run_rules(&schema(), &rules);
        assert!(results.iter().all(|r| r.passed));
    }
}
