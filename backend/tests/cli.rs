//! The `starload` binary's exit status and output.

mod common;

use std::process::{Command, Output};

use serde_json::Value;
use starload::PipelinePaths;

use common::{add_duplicate_customer, project};

fn run_cli(paths: &PipelinePaths) -> Output {
    Command::new(env!("CARGO_BIN_EXE_starload"))
        .arg("--project-root")
        .arg(paths.root())
        .current_dir(paths.root())
        .env_remove("STARLOAD_PROJECT_ROOT")
        .env_remove("STARLOAD_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_cli_success_prints_report() {
    let (_dir, paths) = project();

    let output = run_cli(&paths);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dropped_sales"], Value::from(0));
    assert_eq!(report["table_rows"]["fact_sales"], Value::from(20));
    assert!(paths.curated().join("fact_sales.csv").is_file());
}

#[test]
fn test_cli_quality_failure_exits_non_zero() {
    let (_dir, paths) = project();
    add_duplicate_customer(&paths);

    let output = run_cli(&paths);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("❌ Error: Data quality checks failed"));
    assert!(stderr.contains("unique:dim_customer(customer_code)"));
    assert!(output.stdout.is_empty());
    assert!(!paths.curated().exists());
}

#[test]
fn test_cli_missing_sources_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let paths = PipelinePaths::new(dir.path());

    let output = run_cli(&paths);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("customers.csv"));
}
