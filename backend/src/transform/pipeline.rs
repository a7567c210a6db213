//! End-to-end batch run: extract, transform, quality gate, load.
//!
//! Every stage is synchronous and single pass. Any error aborts the run
//! before anything is written to `output/curated`.
//!
//! # Example
//!
//! ```rust,ignore
//! use starload::{run_pipeline, PipelineOptions};
//!
//! let report = run_pipeline(&PipelineOptions::default())?;
//! println!("{} fact rows", report.table_rows["fact_sales"]);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date::build_dim_date;
use super::dimensions::{build_dim_customer, build_dim_product, build_dim_store};
use super::fact::build_fact_sales;
use crate::error::{CsvResult, PipelineResult, TransformResult};
use crate::load::{load_curated_tables, write_run_report};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{RawSources, StarSchema};
use crate::parser::parse_table_file;
use crate::validation::{run_quality_checks, QualityCheckResult};

// =============================================================================
// Paths & Options
// =============================================================================

/// Fixed directory layout under a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    root: PathBuf,
}

impl PipelinePaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `data/raw`: customers, products, stores, sales
    pub fn raw(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    /// `data/reference`: calendar
    pub fn reference(&self) -> PathBuf {
        self.root.join("data").join("reference")
    }

    pub fn staging(&self) -> PathBuf {
        self.root.join("output").join("staging")
    }

    pub fn curated(&self) -> PathBuf {
        self.root.join("output").join("curated")
    }
}

/// Options for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Directory holding `data/` and receiving `output/`
    pub project_root: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
        }
    }
}

impl PipelineOptions {
    pub fn paths(&self) -> PipelinePaths {
        PipelinePaths::new(&self.project_root)
    }
}

// =============================================================================
// Run Report
// =============================================================================

/// Summary of a completed run, written to `output/staging/run_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Rows read per raw source
    pub source_rows: BTreeMap<String, usize>,

    /// Rows written per curated table
    pub table_rows: BTreeMap<String, usize>,

    /// Sales rows that did not survive the dimension joins
    pub dropped_sales: usize,

    pub checks: Vec<QualityCheckResult>,

    /// Written curated files
    pub outputs: Vec<PathBuf>,
}

// =============================================================================
// Stages
// =============================================================================

/// Read the four raw extracts and the reference calendar.
pub fn extract_raw_sources(paths: &PipelinePaths) -> CsvResult<RawSources> {
    let raw = paths.raw();
    Ok(RawSources {
        customers: parse_table_file(raw.join("customers.csv"))?,
        products: parse_table_file(raw.join("products.csv"))?,
        stores: parse_table_file(raw.join("stores.csv"))?,
        sales: parse_table_file(raw.join("sales.csv"))?,
        calendar: parse_table_file(paths.reference().join("calendar.csv"))?,
    })
}

/// Build all dimensions, then the fact. No quality gate.
pub fn build_star_schema(raw: &RawSources) -> TransformResult<StarSchema> {
    let dim_customer = build_dim_customer(&raw.customers)?;
    let dim_product = build_dim_product(&raw.products)?;
    let dim_store = build_dim_store(&raw.stores)?;
    let dim_date = build_dim_date(&raw.calendar, &raw.sales)?;

    let fact_sales = build_fact_sales(&raw.sales, &dim_customer, &dim_product, &dim_store, &dim_date)?;

    Ok(StarSchema {
        dim_customer,
        dim_product,
        dim_store,
        dim_date,
        fact_sales,
    })
}

/// Build the star schema and enforce the quality rules on it.
pub fn transform_to_star_schema(raw: &RawSources) -> PipelineResult<StarSchema> {
    let schema = build_star_schema(raw)?;
    run_quality_checks(&schema)?;
    Ok(schema)
}

// =============================================================================
// Run
// =============================================================================

/// Run the whole pipeline under `options.project_root`.
pub fn run_pipeline(options: &PipelineOptions) -> PipelineResult<RunReport> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    let paths = options.paths();

    log_info(format!("📖 Extracting sources from {}", paths.root().display()));
    let raw = extract_raw_sources(&paths)?;
    let source_rows: BTreeMap<String, usize> = raw.row_counts().into_iter().collect();
    for (name, rows) in &source_rows {
        log_info_indent(format!("{}: {} rows", name, rows), 1);
    }

    log_info("⚙️  Building star schema...");
    let schema = build_star_schema(&raw)?;
    let table_rows: BTreeMap<String, usize> = schema
        .tables()
        .iter()
        .map(|(name, table)| (name.to_string(), table.len()))
        .collect();
    for (name, table) in schema.tables() {
        log_success(format!("{}: {} rows", name, table.len()));
    }

    // Fan-out can hide drops; this only sees the net difference.
    let dropped_sales = raw.sales.len().saturating_sub(schema.fact_sales.len());
    if dropped_sales > 0 {
        log_warning(format!(
            "{} of {} sales rows did not match every dimension and were dropped",
            dropped_sales,
            raw.sales.len()
        ));
    }

    log_info("✔️  Running quality checks...");
    let checks = run_quality_checks(&schema)?;
    log_success(format!("All {} quality checks passed", checks.len()));

    log_info(format!("💾 Writing curated tables to {}", paths.curated().display()));
    let outputs = load_curated_tables(&paths, &schema)?;

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        source_rows,
        table_rows,
        dropped_sales,
        checks,
        outputs,
    };
    let report_path = write_run_report(&paths, &report)?;
    log_success(format!("Run report written to {}", report_path.display()));

    Ok(report)
}
