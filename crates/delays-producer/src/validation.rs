//! Required-field gate applied before publishing

use delays_common::RawRecord;

pub const INCIDENT_FIELD: &str = "is_incident";
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Presence check only; a `null` value still counts as present
pub fn has_incident_field(record: &RawRecord) -> bool {
    record.contains_key(INCIDENT_FIELD)
}

pub fn has_timestamp_field(record: &RawRecord) -> bool {
    record.contains_key(TIMESTAMP_FIELD)
}

/// Required fields the record lacks, in check order
pub fn missing_fields(record: &RawRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !has_incident_field(record) {
        missing.push(INCIDENT_FIELD);
    }
    if !has_timestamp_field(record) {
        missing.push(TIMESTAMP_FIELD);
    }
    missing
}
