//! FAQ dataset loading.
//!
//! Every supported tabular format is one variant of [`DatasetFormat`]; all of
//! them produce the same [`FaqRecord`] rows.

mod delimited;
mod json_lines;

use crate::error::{CandlelightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Supported dataset formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row.
    Tsv,
    /// One JSON object per line.
    #[serde(alias = "ndjson")]
    Jsonl,
}

impl DatasetFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(DatasetFormat::Csv),
            "tsv" | "tab" => Some(DatasetFormat::Tsv),
            "jsonl" | "ndjson" => Some(DatasetFormat::Jsonl),
            _ => None,
        }
    }
}

impl std::str::FromStr for DatasetFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(DatasetFormat::Csv),
            "tsv" | "tab" => Ok(DatasetFormat::Tsv),
            "jsonl" | "ndjson" | "json-lines" => Ok(DatasetFormat::Jsonl),
            _ => Err(format!("Unknown dataset format: {}", s)),
        }
    }
}

impl std::fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetFormat::Csv => write!(f, "csv"),
            DatasetFormat::Tsv => write!(f, "tsv"),
            DatasetFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Where to read the FAQ from and which column identifies each row.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub path: PathBuf,
    pub source_column: String,
    /// Explicit format; inferred from the extension when `None`.
    pub format: Option<DatasetFormat>,
}

impl DatasetSpec {
    pub fn new(path: impl Into<PathBuf>, source_column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_column: source_column.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// The explicit format, or the one implied by the file extension.
    pub fn resolved_format(&self) -> Result<DatasetFormat> {
        self.format
            .or_else(|| DatasetFormat::from_path(&self.path))
            .ok_or_else(|| {
                CandlelightError::Dataset(format!(
                    "cannot infer the format of {}; pass --format csv|tsv|jsonl",
                    self.path.display()
                ))
            })
    }
}

/// One row of the FAQ dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqRecord {
    /// 0-based row number, header excluded.
    pub row: usize,
    /// Value of the designated source column.
    pub source: String,
    /// All fields of the row, in column order.
    pub fields: Vec<(String, String)>,
}

impl FaqRecord {
    /// Render the row as retrievable text: one `column: value` line per field.
    pub fn content(&self) -> String {
        self.fields
            .iter()
            .map(|(column, value)| format!("{}: {}", column.trim(), value.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Look up a field by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c.trim() == column)
            .map(|(_, v)| v.as_str())
    }
}

/// Load every row of a dataset.
#[instrument(skip_all, fields(path = %spec.path.display()))]
pub fn load_dataset(spec: &DatasetSpec) -> Result<Vec<FaqRecord>> {
    if !spec.path.is_file() {
        return Err(CandlelightError::DatasetNotFound(spec.path.clone()));
    }

    let format = spec.resolved_format()?;
    debug!("Loading {} dataset", format);

    let records = match format {
        DatasetFormat::Csv => delimited::load(&spec.path, b',', &spec.source_column)?,
        DatasetFormat::Tsv => delimited::load(&spec.path, b'\t', &spec.source_column)?,
        DatasetFormat::Jsonl => json_lines::load(&spec.path, &spec.source_column)?,
    };

    debug!("Loaded {} rows", records.len());
    Ok(records)
}
