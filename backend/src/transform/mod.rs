//! Transformation module.
//!
//! This module reshapes raw extracts into the star schema:
//! - Values: typed cell parsing (dates, timestamps, numbers)
//! - Dimensions: customer, product and store
//! - Date: reference calendar unioned with transaction dates
//! - Fact: sales joined against every dimension
//! - Pipeline: extract, transform, quality gate, load

pub mod date;
pub mod dimensions;
pub mod fact;
pub mod pipeline;
pub mod values;

pub use date::build_dim_date;
pub use dimensions::{build_dim_customer, build_dim_product, build_dim_store, PREMIUM_UNIT_COST};
pub use fact::build_fact_sales;
pub use pipeline::*;
