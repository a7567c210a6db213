//! Sales fact table.
//!
//! Inner-joins every transaction against the four dimensions on their
//! natural keys and resolves surrogate keys. Rows that miss any dimension
//! are dropped without error: this is a join, not a validator.
//!
//! Output order follows the transactions; when a dimension holds several
//! rows for one natural key the transaction fans out in dimension order.

use std::collections::HashMap;

use serde_json::Value;

use super::values::{date_key, float_cell, key_text, round2, ColumnReader, TIMESTAMP_OUTPUT};
use crate::error::{TransformError, TransformResult};
use crate::models::{add_surrogate_key, Table};

/// Columns of `fact_sales` after the surrogate key.
pub const FACT_COLUMNS: [&str; 13] = [
    "sale_id",
    "date_sk",
    "store_sk",
    "product_sk",
    "customer_sk",
    "order_datetime",
    "quantity",
    "unit_price",
    "discount",
    "gross_amount",
    "net_amount",
    "payment_type",
    "channel",
];

/// Natural key -> surrogate keys, in dimension row order.
struct KeyLookup {
    keys: HashMap<String, Vec<Value>>,
}

impl KeyLookup {
    fn new(dim: &Table, natural: &str, surrogate: &str) -> TransformResult<Self> {
        let natural_idx = dim.require_column(natural)?;
        let surrogate_idx = dim.require_column(surrogate)?;

        let mut keys: HashMap<String, Vec<Value>> = HashMap::new();
        for row in dim.rows() {
            if let Some(k) = key_text(&row[natural_idx]) {
                keys.entry(k).or_default().push(row[surrogate_idx].clone());
            }
        }
        Ok(Self { keys })
    }

    fn resolve(&self, natural: &Value) -> &[Value] {
        key_text(natural)
            .and_then(|k| self.keys.get(&k))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Build `fact_sales` from the sales extract and the finished dimensions.
pub fn build_fact_sales(
    sales: &Table,
    dim_customer: &Table,
    dim_product: &Table,
    dim_store: &Table,
    dim_date: &Table,
) -> TransformResult<Table> {
    let customers = KeyLookup::new(dim_customer, "customer_code", "customer_sk")?;
    let products = KeyLookup::new(dim_product, "product_code", "product_sk")?;
    let stores = KeyLookup::new(dim_store, "store_code", "store_sk")?;
    let dates = KeyLookup::new(dim_date, "date_key", "date_sk")?;

    let sale_id = ColumnReader::new(sales, "sale_id")?;
    let order = ColumnReader::new(sales, "order_datetime")?;
    let customer_id = ColumnReader::new(sales, "customer_id")?;
    let product_id = ColumnReader::new(sales, "product_id")?;
    let store_id = ColumnReader::new(sales, "store_id")?;
    let quantity = ColumnReader::new(sales, "quantity")?;
    let unit_price = ColumnReader::new(sales, "unit_price")?;
    let discount = ColumnReader::new(sales, "discount")?;
    let payment_type = ColumnReader::new(sales, "payment_type")?;
    let channel = ColumnReader::new(sales, "channel")?;

    let mut fact = Table::new("fact_sales", FACT_COLUMNS.to_vec());

    for i in 0..sales.len() {
        let ordered_at = order.timestamp(i)?;
        let day_key = Value::from(date_key(ordered_at.date()));

        let qty = quantity.number(i)?;
        let price = unit_price.number(i)?;
        let disc = discount.number(i)?;
        let gross = round2(qty * price);
        let net = round2(gross - disc);

        let amount = |column: &str, value: f64| {
            float_cell(value).ok_or_else(|| TransformError::InvalidNumber {
                table: sales.name().to_string(),
                column: column.to_string(),
                row: i + 1,
                value: value.to_string(),
            })
        };
        let measures = [
            quantity.required_numeric_cell(i)?,
            unit_price.required_numeric_cell(i)?,
            discount.required_numeric_cell(i)?,
            amount("gross_amount", gross)?,
            amount("net_amount", net)?,
        ];

        for customer_sk in customers.resolve(customer_id.raw(i)) {
            for product_sk in products.resolve(product_id.raw(i)) {
                for store_sk in stores.resolve(store_id.raw(i)) {
                    for date_sk in dates.resolve(&day_key) {
                        let mut row = vec![
                            sale_id.raw(i).clone(),
                            date_sk.clone(),
                            store_sk.clone(),
                            product_sk.clone(),
                            customer_sk.clone(),
                            Value::String(ordered_at.format(TIMESTAMP_OUTPUT).to_string()),
                        ];
                        row.extend(measures.iter().cloned());
                        row.push(payment_type.raw(i).clone());
                        row.push(channel.raw(i).clone());
                        fact.push_row(row)?;
                    }
                }
            }
        }
    }

    Ok(add_surrogate_key(fact, "sale_sk"))
}
