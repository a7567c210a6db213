//! Delimited-text reader with encoding and delimiter auto-detection.
//!
//! Turns one source file into one [`Table`]. No star-schema logic here.

use std::path::Path;

use serde_json::Value;

use crate::error::{CsvError, CsvResult};
use crate::models::{text_cell, Table};

/// Detect the encoding of raw bytes using chardet
///
/// Bytes that already form valid UTF-8 are reported as UTF-8 without
/// consulting chardet, which misreads short accented samples.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string. Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when the header holds none of the candidates.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a table named `name`.
///
/// Fields are trimmed and empty fields become `Null`. Short rows are padded,
/// extra fields are ignored, blank lines are skipped.
///
/// # Example
/// ```ignore
/// let table = parse_table("stores", "store_id,city\nS1,Recife", ',')?;
/// assert_eq!(table.len(), 1);
/// ```
pub fn parse_table(name: &str, content: &str, delimiter: char) -> CsvResult<Table> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile(name.to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(name, &e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders(name.to_string()));
    }

    let mut table = Table::new(name, headers);
    let width = table.columns().len();

    for record in reader.records() {
        let record = record.map_err(|e| parse_error(name, &e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: Vec<Value> = (0..width)
            .map(|i| record.get(i).map(text_cell).unwrap_or(Value::Null))
            .collect();

        table
            .push_row(row)
            .map_err(|e| CsvError::ParseError {
                table: name.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                message: e.to_string(),
            })?;
    }

    Ok(table)
}

fn parse_error(name: &str, err: &csv::Error) -> CsvError {
    CsvError::ParseError {
        table: name.to_string(),
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

/// Parse raw bytes with auto-detected encoding and delimiter.
pub fn parse_bytes_auto(name: &str, bytes: &[u8]) -> CsvResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_table(name, &content, delimiter)
}

/// Read a CSV file into a table named after the file stem.
pub fn parse_table_file<P: AsRef<Path>>(path: P) -> CsvResult<Table> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table");

    parse_bytes_auto(name, &bytes)
}
