//! # Starload - retail CSV extracts to a validated star schema
//!
//! Starload reads raw customer, product, store and sales extracts plus a
//! reference calendar, builds four dimensions and a sales fact table with
//! surrogate keys, runs a data-quality gate and writes the curated tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  data/raw   │────▶│  Builders   │────▶│   Quality   │────▶│   output/   │
//! │ (CSV files) │     │ (dims+fact) │     │    gate     │     │   curated   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starload::{run_pipeline, PipelineOptions};
//!
//! fn main() {
//!     let report = run_pipeline(&PipelineOptions::default()).unwrap();
//!     println!("Dropped {} sales rows", report.dropped_sales);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tables, raw sources and the star schema
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Dimension, date and fact builders plus the pipeline
//! - [`validation`] - Data-quality checks and rules
//! - [`load`] - Curated table and run report persistence
//! - [`logs`] - Run logging

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Persistence
pub mod load;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, LoadError, PipelineError, QualityError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{add_surrogate_key, RawSources, StarSchema, Table, CURATED_TABLES};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_table,
    parse_table_file,
};

// =============================================================================
// Re-exports - Builders
// =============================================================================

pub use transform::{
    build_dim_customer,
    build_dim_date,
    build_dim_product,
    build_dim_store,
    build_fact_sales,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    check_foreign_key,
    check_not_null,
    check_unique,
    ensure_quality,
    run_quality_checks,
    run_rules,
    star_schema_rules,
    QualityCheckResult,
    QualityRule,
};

// =============================================================================
// Re-exports - Load
// =============================================================================

pub use load::{load_curated_tables, write_run_report};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_star_schema,
    extract_raw_sources,
    run_pipeline,
    transform_to_star_schema,
    PipelineOptions,
    PipelinePaths,
    RunReport,
};
