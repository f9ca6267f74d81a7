//! Shared CSV utilities for codebook tables.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{CodebookError, Result};

pub type Row = BTreeMap<String, String>;

/// Read a CSV file into a vector of row maps.
///
/// Keys are the header names with any BOM stripped; values are trimmed.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let csv_error = |error: csv::Error| CodebookError::Csv {
        path: path.to_path_buf(),
        message: error.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| match error.into_kind() {
            csv::ErrorKind::Io(source) => CodebookError::io(path, source),
            other => CodebookError::Csv {
                path: path.to_path_buf(),
                message: format!("{other:?}"),
            },
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = Row::new();
        for (idx, value) in record.iter().enumerate() {
            if let Some(key) = headers.get(idx) {
                row.insert(key.clone(), value.trim().to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Fail unless every row set carries the given header.
pub fn require_column(rows: &[Row], column: &str, path: &Path) -> Result<()> {
    match rows.first() {
        Some(row) if !row.contains_key(column) => Err(CodebookError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Get a field value from a row, returning an empty string if not present.
pub fn get_field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}
