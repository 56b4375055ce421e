//! Persistence seams for the pipeline
//!
//! Two stores sit behind traits so the orchestrator can be driven against
//! Postgres/DynamoDB in production and in-memory doubles in tests:
//!
//! - [`DelayStore`]: write-once canonical rows keyed by `record_id`
//! - [`StatusStore`]: last-write-wins status entry per `record_id`

use async_trait::async_trait;

use crate::error::{LoadError, StatusError};
use crate::models::{DelayRecord, StatusEntry};

pub mod dynamodb;
pub mod memory;
pub mod postgres;

pub use dynamodb::DynamoStatusStore;
pub use memory::{MemoryDelayStore, MemoryStatusStore};
pub use postgres::PgDelayStore;

/// What an idempotent insert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Inserted,
    /// A row with the same `record_id` existed; it was left untouched
    AlreadyPresent,
}

/// Relational store for canonical delay records
#[async_trait]
pub trait DelayStore: Send + Sync {
    /// Insert the record unless its `record_id` is already stored.
    ///
    /// Must be atomic per record and must never overwrite an existing row.
    async fn insert_if_absent(&self, record: &DelayRecord) -> Result<LoadOutcome, LoadError>;
}

/// Key-value store holding the latest processing status per record
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Put the entry, replacing whatever was stored for its `record_id`
    async fn put_status(&self, entry: &StatusEntry) -> Result<(), StatusError>;

    async fn record_success(&self, record_id: &str) -> Result<(), StatusError> {
        self.put_status(&StatusEntry::success(record_id)).await
    }

    async fn record_error(&self, record_id: &str, message: &str) -> Result<(), StatusError> {
        self.put_status(&StatusEntry::error(record_id, message)).await
    }
}
