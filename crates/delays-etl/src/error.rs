//! Error types for the delay ETL pipeline
//!
//! Each pipeline stage has its own error kind. Normalization has none: malformed
//! input degrades to per-field defaults instead of failing.

use thiserror::Error;

/// Result type alias for a single record's trip through the pipeline
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Failure to turn a stream envelope into a raw record
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Envelope carries no payload")]
    MissingPayload,

    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Failure to write a canonical record into the relational store.
///
/// Primary-key conflicts are not errors; they surface as
/// [`LoadOutcome::AlreadyPresent`](crate::store::LoadOutcome::AlreadyPresent).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Relational store unavailable: {0}")]
    Unavailable(String),
}

/// Failure to write a status entry into the status store
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Failed to write status for record '{record_id}' to table '{table}': {message}")]
    Put {
        record_id: String,
        table: String,
        message: String,
    },

    #[error("Status store unavailable: {0}")]
    Unavailable(String),
}

/// Any failure that short-circuits one record
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Status update failed: {0}")]
    Status(#[from] StatusError),
}

impl PipelineError {
    /// Short stage label used in structured logs
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) => "decode",
            PipelineError::Load(_) => "load",
            PipelineError::Status(_) => "status",
        }
    }
}
