//! Transit Delays Common Library
//!
//! Shared types and utilities for the transit-delays workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by both the stream producer and the
//! ETL consumer:
//!
//! - **Error Handling**: I/O and serialization errors for record sources
//! - **Logging**: `tracing` subscriber setup driven by environment variables
//! - **Records**: The raw record shape and legacy row-identifier handling
//!
//! # Example
//!
//! ```no_run
//! use delays_common::record::{legacy_record_id, RawRecord};
//!
//! let raw: RawRecord = serde_json::from_str(r#"{"Unnamed: 0": 42}"#).unwrap();
//! assert_eq!(legacy_record_id(&raw), "42");
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod record;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use record::{legacy_record_id, RawRecord, LEGACY_ID_FIELD, UNKNOWN_RECORD_ID};
