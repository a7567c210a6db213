//! Customer, product and store dimensions.
//!
//! Each builder reads a raw extract, renames and selects its columns,
//! derives its extra attributes and numbers the rows with a surrogate key.
//! One dimension row per input row: uniqueness of the natural key is
//! checked later by the quality gate, not enforced here.

use serde_json::Value;

use super::values::ColumnReader;
use crate::error::TransformResult;
use crate::models::{add_surrogate_key, Table};

/// Products at or above this unit cost are flagged premium.
pub const PREMIUM_UNIT_COST: f64 = 9.0;

/// Copy `(source, target)` columns of `raw` into a new table named `name`.
///
/// `derive` appends extra cells per row after the copied ones.
fn project<F>(
    raw: &Table,
    name: &str,
    mapping: &[(&str, &str)],
    derived: &[&str],
    mut derive: F,
) -> TransformResult<Table>
where
    F: FnMut(usize) -> TransformResult<Vec<Value>>,
{
    let indices = mapping
        .iter()
        .map(|(source, _)| raw.require_column(source))
        .collect::<TransformResult<Vec<_>>>()?;

    let columns: Vec<&str> = mapping
        .iter()
        .map(|(_, target)| *target)
        .chain(derived.iter().copied())
        .collect();

    let mut table = Table::new(name, columns);
    for (i, row) in raw.rows().iter().enumerate() {
        let mut out: Vec<Value> = indices.iter().map(|&idx| row[idx].clone()).collect();
        out.extend(derive(i)?);
        table.push_row(out)?;
    }
    Ok(table)
}

/// Reorder `table` to `order`, every name being one of its columns.
fn select(table: Table, order: &[&str]) -> TransformResult<Table> {
    let indices = order
        .iter()
        .map(|c| table.require_column(c))
        .collect::<TransformResult<Vec<_>>>()?;

    let mut selected = Table::new(table.name(), order.to_vec());
    for row in table.rows() {
        selected.push_row(indices.iter().map(|&i| row[i].clone()).collect())?;
    }
    Ok(selected)
}

// =============================================================================
// Customer
// =============================================================================

/// Build `dim_customer` from the `customers` extract.
///
/// `full_name` is `first_name + " " + last_name`, null if either part is.
pub fn build_dim_customer(customers: &Table) -> TransformResult<Table> {
    let first = ColumnReader::new(customers, "first_name")?;
    let last = ColumnReader::new(customers, "last_name")?;
    let signup = ColumnReader::new(customers, "signup_date")?;

    let dim = project(
        customers,
        "dim_customer",
        &[
            ("customer_id", "customer_code"),
            ("email", "email"),
            ("city", "city"),
            ("state", "state"),
            ("loyalty_tier", "loyalty_tier"),
        ],
        &["full_name", "signup_date"],
        |i| {
            let full_name = match (first.raw(i), last.raw(i)) {
                (Value::Null, _) | (_, Value::Null) => Value::Null,
                (f, l) => Value::String(format!("{} {}", plain(f), plain(l))),
            };
            Ok(vec![full_name, signup.optional_date_cell(i)?])
        },
    )?;

    let dim = select(
        dim,
        &[
            "customer_code",
            "full_name",
            "email",
            "city",
            "state",
            "loyalty_tier",
            "signup_date",
        ],
    )?;
    Ok(add_surrogate_key(dim, "customer_sk"))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Product
// =============================================================================

/// Build `dim_product` from the `products` extract.
///
/// `premium_flag` is `unit_cost >= 9.0`; a null cost is not premium.
pub fn build_dim_product(products: &Table) -> TransformResult<Table> {
    let cost = ColumnReader::new(products, "unit_cost")?;

    let dim = project(
        products,
        "dim_product",
        &[
            ("product_id", "product_code"),
            ("product_name", "product_name"),
            ("category", "category"),
            ("sub_category", "sub_category"),
            ("brand", "brand"),
        ],
        &["unit_cost", "premium_flag"],
        |i| {
            let unit_cost = cost.numeric_cell(i)?;
            let premium = unit_cost
                .as_f64()
                .is_some_and(|c| c >= PREMIUM_UNIT_COST);
            Ok(vec![unit_cost, Value::Bool(premium)])
        },
    )?;

    Ok(add_surrogate_key(dim, "product_sk"))
}

// =============================================================================
// Store
// =============================================================================

/// Build `dim_store` from the `stores` extract. Rename and select only.
pub fn build_dim_store(stores: &Table) -> TransformResult<Table> {
    let opening = ColumnReader::new(stores, "opening_date")?;

    let dim = project(
        stores,
        "dim_store",
        &[
            ("store_id", "store_code"),
            ("store_name", "store_name"),
            ("city", "city"),
            ("state", "state"),
            ("region", "region"),
            ("store_format", "store_format"),
        ],
        &["opening_date"],
        |i| Ok(vec![opening.optional_date_cell(i)?]),
    )?;

    Ok(add_surrogate_key(dim, "store_sk"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customers() -> Table {
        Table::from_text_rows(
            "customers",
            &[
                "customer_id",
                "first_name",
                "last_name",
                "email",
                "city",
                "state",
                "loyalty_tier",
                "signup_date",
            ],
            &[
                &["C001", "Ana", "Souza", "ana@example.com", "Recife", "PE", "Gold", "2022-01-15"],
                &["C002", "Bruno", "", "bruno@example.com", "Natal", "RN", "Silver", ""],
                &["C001", "Ana", "Souza", "ana2@example.com", "Recife", "PE", "Gold", "2022-01-15"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_customer_projection_and_full_name() {
        let dim = build_dim_customer(&customers()).unwrap();

        assert_eq!(
            dim.columns(),
            &[
                "customer_sk",
                "customer_code",
                "full_name",
                "email",
                "city",
                "state",
                "loyalty_tier",
                "signup_date"
            ]
        );
        assert_eq!(dim.cell(0, "full_name"), Some(&json!("Ana Souza")));
        assert_eq!(dim.cell(1, "full_name"), Some(&Value::Null));
        assert_eq!(dim.cell(1, "signup_date"), Some(&Value::Null));
        assert_eq!(dim.cell(0, "customer_code"), Some(&json!("C001")));
    }

    #[test]
    fn test_customer_keeps_duplicates() {
        let dim = build_dim_customer(&customers()).unwrap();
        assert_eq!(dim.len(), 3);
        let keys: Vec<_> = dim.column_values("customer_sk").unwrap().cloned().collect();
        assert_eq!(keys, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_customer_input_untouched() {
        let raw = customers();
        let before = raw.clone();
        build_dim_customer(&raw).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_customer_bad_signup_date() {
        let raw = Table::from_text_rows(
            "customers",
            &["customer_id", "first_name", "last_name", "email", "city", "state", "loyalty_tier", "signup_date"],
            &[&["C9", "Rui", "Lima", "r@x.com", "Belém", "PA", "Bronze", "not a date"]],
        )
        .unwrap();
        let err = build_dim_customer(&raw).unwrap_err();
        assert!(err.to_string().contains("signup_date"));
    }

    #[test]
    fn test_product_premium_flag_threshold() {
        let raw = Table::from_text_rows(
            "products",
            &["product_id", "product_name", "category", "sub_category", "brand", "unit_cost"],
            &[
                &["P1", "Café", "Bebidas", "Quentes", "Serra", "9.0"],
                &["P2", "Chá", "Bebidas", "Quentes", "Serra", "8.99"],
                &["P3", "Água", "Bebidas", "Frias", "Fonte", ""],
                &["P4", "Vinho", "Bebidas", "Alcoólicas", "Vale", "42"],
            ],
        )
        .unwrap();

        let dim = build_dim_product(&raw).unwrap();
        assert_eq!(
            dim.columns(),
            &["product_sk", "product_code", "product_name", "category", "sub_category", "brand", "unit_cost", "premium_flag"]
        );
        let flags: Vec<_> = dim.column_values("premium_flag").unwrap().cloned().collect();
        assert_eq!(flags, vec![json!(true), json!(false), json!(false), json!(true)]);
        assert_eq!(dim.cell(1, "unit_cost"), Some(&json!(8.99)));
        assert_eq!(dim.cell(3, "unit_cost"), Some(&json!(42)));
    }

    #[test]
    fn test_product_invalid_cost() {
        let raw = Table::from_text_rows(
            "products",
            &["product_id", "product_name", "category", "sub_category", "brand", "unit_cost"],
            &[&["P1", "Café", "Bebidas", "Quentes", "Serra", "nove"]],
        )
        .unwrap();
        assert!(build_dim_product(&raw).is_err());
    }

    #[test]
    fn test_store_projection() {
        let raw = Table::from_text_rows(
            "stores",
            &["store_id", "store_name", "city", "state", "region", "store_format", "opening_date", "manager"],
            &[&["S1", "Centro", "Recife", "PE", "Nordeste", "Mall", "2019-05-20", "Joana"]],
        )
        .unwrap();

        let dim = build_dim_store(&raw).unwrap();
        assert_eq!(
            dim.columns(),
            &["store_sk", "store_code", "store_name", "city", "state", "region", "store_format", "opening_date"]
        );
        assert_eq!(dim.cell(0, "store_sk"), Some(&json!(1)));
        assert_eq!(dim.cell(0, "opening_date"), Some(&json!("2019-05-20")));
    }

    #[test]
    fn test_store_missing_column() {
        let raw = Table::from_text_rows("stores", &["store_id"], &[&["S1"]]).unwrap();
        let err = build_dim_store(&raw).unwrap_err();
        assert!(err.to_string().contains("opening_date"));
    }
}
