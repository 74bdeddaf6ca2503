//! JSON Lines loading.

use super::FaqRecord;
use crate::error::{CandlelightError, Result};
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub(super) fn load(path: &Path, source_column: &str) -> Result<Vec<FaqRecord>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let object = match serde_json::from_str::<Value>(&line)? {
            Value::Object(map) => map,
            other => {
                return Err(CandlelightError::Dataset(format!(
                    "line {} of {} is not a JSON object (found {})",
                    line_no + 1,
                    path.display(),
                    type_name(&other)
                )))
            }
        };

        let fields: Vec<(String, String)> = object
            .into_iter()
            .map(|(key, value)| (key, value_to_text(value)))
            .collect();

        let source = fields
            .iter()
            .find(|(key, _)| key.trim() == source_column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                CandlelightError::Dataset(format!(
                    "line {} of {} has no '{}' field",
                    line_no + 1,
                    path.display(),
                    source_column
                ))
            })?;

        records.push(FaqRecord {
            row: records.len(),
            source,
            fields,
        });
    }

    Ok(records)
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
