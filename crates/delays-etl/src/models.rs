//! Data models for the delay ETL pipeline

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of stream input.
///
/// The payload is kept as the base64 text the stream delivered; decoding is
/// deferred to the [`decoder`](crate::decoder) so that a malformed payload only
/// fails its own record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    /// Base64-encoded UTF-8 JSON object, `None` when the stream record had no data
    pub payload: Option<String>,
    pub partition_key: Option<String>,
    pub sequence_number: Option<String>,
}

impl StreamEnvelope {
    /// Envelope carrying the given base64 payload
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            ..Self::default()
        }
    }
}

/// Canonical delay record, the row persisted into the `delays` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayRecord {
    /// Primary key, never empty
    pub record_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub flight_id: Option<String>,
    pub location: Option<String>,
    pub location_hour: Option<i32>,
    pub location_part_of_day: Option<String>,
    pub delay_category: Option<String>,
    /// Minutes, non-negative, 0 when the source value was unusable
    pub dwell_time: i32,
    pub incident: Option<bool>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    /// Source fields without a column; logged, never persisted
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

impl DelayRecord {
    /// Empty record with only the primary key set
    pub fn with_id(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            timestamp: None,
            flight_id: None,
            location: None,
            location_hour: None,
            location_part_of_day: None,
            delay_category: None,
            dwell_time: 0,
            incident: None,
            year: None,
            month: None,
            day: None,
            extra: Map::new(),
        }
    }
}

/// Terminal processing outcome of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "success",
            ProcessingStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ProcessingStatus::Success),
            "error" => Ok(ProcessingStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid processing status: {}", s)),
        }
    }
}

/// Last known outcome for one record identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub record_id: String,
    pub status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusEntry {
    pub fn success(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            status: ProcessingStatus::Success,
            error: None,
        }
    }

    /// Error entry; an empty message is dropped rather than stored
    pub fn error(record_id: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            record_id: record_id.into(),
            status: ProcessingStatus::Error,
            error: (!message.is_empty()).then_some(message),
        }
    }
}

/// Aggregate result of one batch, serialized as `{"success": N, "failed": M}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}
