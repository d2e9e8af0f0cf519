use crate::data::{Cell, RawTable};
use crate::error::IngestError;
use std::io::{self, Read};
use tracing::debug;

/// Read a CSV table from stdin
pub fn read_csv_from_stdin() -> Result<RawTable, IngestError> {
    let stdin = io::stdin();
    read_csv(stdin.lock())
}

/// Read a CSV table from any byte stream.
///
/// The first record is the header. Short rows are padded with empty cells;
/// rows wider than the header are rejected.
pub fn read_csv<R: Read>(input: R) -> Result<RawTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.records();
    let header_record = match records.next() {
        Some(record) => record?,
        None => return Err(IngestError::Empty),
    };
    let headers = dedupe_headers(
        header_record
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
    );
    let width = headers.len();

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(IngestError::RowWidth {
                line,
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Cell> = record.iter().map(Cell::text).collect();
        row.resize(width, Cell::text(""));
        rows.push(row);
    }

    debug!(columns = width, rows = rows.len(), "parsed CSV input");
    Ok(RawTable::new(headers, rows))
}

/// Disambiguate repeated header names as `name`, `name.1`, `name.2`, ...
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut candidate = header.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", header, n);
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}
