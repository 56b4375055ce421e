//! Raw record shape as delivered by the upstream export
//!
//! Source rows come from a dataframe export, so the only identifier they carry
//! is the unnamed index column. Both the producer (partition key) and the ETL
//! consumer (primary key) derive the record identifier the same way.

use serde_json::{Map, Value};

/// Raw record: JSON object as received from upstream
pub type RawRecord = Map<String, Value>;

/// Key under which the source export stores the row identifier
pub const LEGACY_ID_FIELD: &str = "Unnamed: 0";

/// Identifier used when no usable row identifier is available
pub const UNKNOWN_RECORD_ID: &str = "unknown";

/// Derive the record identifier from a raw record.
///
/// Strings are used verbatim (surrounding whitespace included, so `" 5 "` and
/// `"5"` stay distinct keys). Numbers use their JSON text and booleans are
/// written `True`/`False`, matching the upstream export. Missing, null, empty,
/// or structured values fall back to [`UNKNOWN_RECORD_ID`] so the result is
/// never empty.
pub fn legacy_record_id(record: &RawRecord) -> String {
    record
        .get(LEGACY_ID_FIELD)
        .and_then(stringify_id)
        .unwrap_or_else(|| UNKNOWN_RECORD_ID.to_string())
}

/// Stringify a single identifier value, `None` when it cannot serve as an id
pub fn stringify_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    (!id.is_empty()).then_some(id)
}
