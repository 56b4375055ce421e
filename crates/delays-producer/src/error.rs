//! Error types for the producer

use delays_common::CommonError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProducerError>;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error(transparent)]
    Source(#[from] CommonError),

    #[error("Failed to serialize record '{record_id}': {source}")]
    Serialize {
        record_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to publish record '{record_id}' to stream '{stream}': {message}")]
    Publish {
        record_id: String,
        stream: String,
        message: String,
    },
}
