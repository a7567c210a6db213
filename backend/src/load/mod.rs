//! Persistence of curated tables and the run report.
//!
//! Curated tables go to `output/curated/<name>.csv`; the report goes to
//! `output/staging/run_report.json`. Both directories are created when
//! missing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{LoadError, LoadResult};
use crate::models::{StarSchema, Table};
use crate::transform::pipeline::PipelinePaths;

/// File name of the run report inside the staging directory.
pub const RUN_REPORT_FILE: &str = "run_report.json";

fn ensure_dir(dir: &Path) -> LoadResult<()> {
    fs::create_dir_all(dir).map_err(|source| LoadError::IoError {
        path: dir.to_path_buf(),
        source,
    })
}

/// Text written for one cell. Null is an empty field.
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Write one table as comma-delimited CSV with a header row.
pub fn write_table_csv(table: &Table, path: &Path) -> LoadResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(render_cell))?;
    }
    writer.flush().map_err(|source| LoadError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

/// Write every curated table. Returns the written paths in load order.
pub fn load_curated_tables(paths: &PipelinePaths, schema: &StarSchema) -> LoadResult<Vec<PathBuf>> {
    ensure_dir(&paths.staging())?;
    let curated = paths.curated();
    ensure_dir(&curated)?;

    let mut written = Vec::with_capacity(5);
    for (name, table) in schema.tables() {
        let path = curated.join(format!("{}.csv", name));
        write_table_csv(table, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Serialize `report` as pretty JSON into the staging directory.
pub fn write_run_report<R: Serialize>(paths: &PipelinePaths, report: &R) -> LoadResult<PathBuf> {
    let staging = paths.staging();
    ensure_dir(&staging)?;

    let path = staging.join(RUN_REPORT_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).map_err(|source| LoadError::IoError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
