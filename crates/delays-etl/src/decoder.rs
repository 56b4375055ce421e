//! Stream envelope decoding
//!
//! Envelope payload → base64 → UTF-8 → JSON object. No schema is enforced:
//! any JSON object is a valid raw record.

use base64::Engine;
use delays_common::RawRecord;
use serde_json::Value;

use crate::error::DecodeError;
use crate::models::StreamEnvelope;

/// Decode one envelope into a raw record
pub fn decode(envelope: &StreamEnvelope) -> Result<RawRecord, DecodeError> {
    let payload = envelope
        .payload
        .as_deref()
        .ok_or(DecodeError::MissingPayload)?;

    decode_payload(payload)
}

/// Decode a base64 payload into a raw record
pub fn decode_payload(payload: &str) -> Result<RawRecord, DecodeError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim().as_bytes())?;
    let text = String::from_utf8(bytes)?;

    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject(json_kind(&other))),
    }
}

/// Encode a raw record the way the producer puts it on the stream
pub fn encode_payload(record: &RawRecord) -> String {
    let json = Value::Object(record.clone()).to_string();
    base64::engine::general_purpose::STANDARD.encode(json.as_bytes())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
