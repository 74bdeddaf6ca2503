//! CSV and TSV loading.

use super::FaqRecord;
use crate::error::{CandlelightError, Result};
use std::path::Path;

pub(super) fn load(path: &Path, delimiter: u8, source_column: &str) -> Result<Vec<FaqRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let source_idx = headers
        .iter()
        .position(|h| h.trim() == source_column)
        .ok_or_else(|| {
            CandlelightError::Dataset(format!(
                "source column '{}' not found in {} (columns: {})",
                source_column,
                path.display(),
                headers.join(", ")
            ))
        })?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let fields: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let source = record.get(source_idx).unwrap_or_default().to_string();
        records.push(FaqRecord { row, source, fields });
    }

    Ok(records)
}
