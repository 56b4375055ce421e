//! Transit delay ETL
//!
//! Consumes base64-encoded JSON delay reports from a stream, normalizes them
//! into canonical [`DelayRecord`]s, loads them idempotently into Postgres and
//! records a per-record processing status in DynamoDB.
//!
//! # Pipeline
//!
//! ```text
//! StreamEnvelope ─decode─▶ RawRecord ─normalize─▶ DelayRecord ─load─▶ delays
//!                                                                 └─status─▶ pipeline_status
//! ```
//!
//! [`BatchOrchestrator`] runs the stages for each envelope and isolates
//! failures per record. Stores are injected through the [`store::DelayStore`]
//! and [`store::StatusStore`] traits.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod decoder;
pub mod error;
pub mod lambda;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod store;

pub use config::EtlConfig;
pub use error::{DecodeError, LoadError, PipelineError, PipelineResult, StatusError};
pub use models::{BatchSummary, DelayRecord, ProcessingStatus, StatusEntry, StreamEnvelope};
pub use orchestrator::{BatchOrchestrator, BatchReport, StatusFailure};
pub use store::{DelayStore, LoadOutcome, StatusStore};
