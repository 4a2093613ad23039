//! Row tables read from CSV.
//!
//! The header row names template columns. Cells are re-ordered to the rule's
//! column order, so a CSV may list columns in any order or omit some.

use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use rtpl_model::Row;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Normalize a CSV header cell: strip the UTF-8 BOM and surrounding whitespace.
fn normalize_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

/// Find the template column a header names. Exact names win; a header
/// without the `$` sigil also matches `$name`.
fn resolve_column(header: &str, columns: &[String]) -> Option<usize> {
    columns
        .iter()
        .position(|column| column == header)
        .or_else(|| {
            columns
                .iter()
                .position(|column| column.strip_prefix('$') == Some(header))
        })
}

/// Read a CSV row table aligned to `columns`.
///
/// Empty cells become null cells. Header columns that name no template
/// column are ignored with a warning; template columns absent from the CSV
/// are null in every row.
pub fn read_row_table(path: &Path, columns: &[String]) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| csv_error(path, source))?;

    let headers = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .clone();
    if headers.iter().all(|header| normalize_header(header).is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for (csv_index, raw) in headers.iter().enumerate() {
        let header = normalize_header(raw);
        match resolve_column(header, columns) {
            Some(column) if mapping.values().any(|taken| *taken == column) => {
                warn!(path = %path.display(), header, "duplicate CSV column ignored");
            }
            Some(column) => {
                mapping.insert(csv_index, column);
            }
            None => {
                warn!(path = %path.display(), header, "CSV column matches no template variable");
            }
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        let mut cells: Vec<Option<String>> = vec![None; columns.len()];
        for (csv_index, value) in record.iter().enumerate() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(&column) = mapping.get(&csv_index) {
                cells[column] = Some(value.to_string());
            }
        }
        rows.push(Row::new(cells));
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "read row table"
    );
    Ok(rows)
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    if let csv::ErrorKind::Io(io) = source.kind()
        && io.kind() == std::io::ErrorKind::NotFound
    {
        return IngestError::FileNotFound {
            path: path.to_path_buf(),
        };
    }
    IngestError::CsvRead {
        path: path.to_path_buf(),
        source,
    }
}
