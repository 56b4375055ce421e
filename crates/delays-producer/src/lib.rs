//! Delay record producer
//!
//! Reads an exported batch of raw delay records, drops records missing the
//! fields downstream consumers rely on, and publishes the rest onto a stream
//! keyed by their legacy row identifier.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod producer;
pub mod publisher;
pub mod source;
pub mod validation;

pub use error::{ProducerError, Result};
pub use producer::{produce, ProducerReport};
pub use publisher::{KinesisPublisher, MemoryPublisher, RecordPublisher};
