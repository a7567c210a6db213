//! Fixture helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use starload::PipelinePaths;

pub const FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/project");

pub fn copy_dir_all(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir_all(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Fresh copy of the fixture project.
pub fn project() -> (tempfile::TempDir, PipelinePaths) {
    let dir = tempfile::tempdir().unwrap();
    copy_dir_all(Path::new(FIXTURE_ROOT), dir.path());
    let paths = PipelinePaths::new(dir.path());
    (dir, paths)
}

pub fn append_line(path: &Path, line: &str) {
    let mut file = fs::OpenOptions::new().append(true).open(path).unwrap();
    writeln!(file, "{}", line).unwrap();
}

/// Second row for customer C001, breaking natural-key uniqueness.
pub fn add_duplicate_customer(paths: &PipelinePaths) {
    append_line(
        &paths.raw().join("customers.csv"),
        "C001,Ana,Souza Filha,ana.filha@example.com,Recife,PE,Bronze,2024-01-01",
    );
}
