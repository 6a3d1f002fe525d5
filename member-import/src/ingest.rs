//! CSV ingest
//!
//! Reads a legacy member export into raw rows. The delimiter is detected
//! from the header line (semicolon exports exist alongside comma ones), a
//! UTF-8 BOM is stripped, and malformed or blank rows are skipped with a
//! warning instead of aborting the batch.

use std::path::Path;

use anyhow::{Context, Result};

use shared::RawRow;

/// Pick the delimiter that splits the header into the most columns
fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Read every usable row of `path` as a header -> value map
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file {}", path.display()))?;
    let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .context("CSV file has no header row")?
        .clone();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Header is line 1, first record is line 2
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line, "Skipping malformed row: {e}");
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    tracing::info!(rows = rows.len(), path = %path.display(), "Read CSV export");
    Ok(rows)
}
