//! Batch file loading

use delays_common::{CommonError, RawRecord};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Load a JSON array of raw records from disk
pub fn load_records(path: impl AsRef<Path>) -> delays_common::Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let records = parse_records(&text)?;

    info!(path = %path.display(), records = records.len(), "Loaded records");
    Ok(records)
}

/// Parse a JSON array whose elements must all be objects
pub fn parse_records(text: &str) -> delays_common::Result<Vec<RawRecord>> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(CommonError::InvalidSource(
            "expected a JSON array of records".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(CommonError::InvalidSource(format!(
                "element {} is not a JSON object",
                index
            ))),
        })
        .collect()
}
