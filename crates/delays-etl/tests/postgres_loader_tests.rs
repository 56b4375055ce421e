//! Loader behavior against a real PostgreSQL
//!
//! Run with: `cargo test -p delays-etl --test postgres_loader_tests -- --ignored`

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{envelope, init_test_tracing, TestPostgres};
use delays_etl::store::{MemoryStatusStore, PgDelayStore};
use delays_etl::{BatchOrchestrator, BatchSummary, DelayRecord, DelayStore, LoadOutcome};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_is_idempotent() -> Result<()> {
    init_test_tracing();
    let pg = TestPostgres::start().await?;
    let store = PgDelayStore::new(pg.pool_clone());

    let mut record = DelayRecord::with_id("42");
    record.location = Some("PLATFORM A".into());
    record.dwell_time = 13;
    record.timestamp = NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(9, 0, 0));

    assert_eq!(store.insert_if_absent(&record).await?, LoadOutcome::Inserted);

    let mut changed = record.clone();
    changed.location = Some("PLATFORM B".into());
    assert_eq!(store.insert_if_absent(&changed).await?, LoadOutcome::AlreadyPresent);

    assert_eq!(store.count().await?, 1);
    let stored = store.fetch("42").await?.expect("row 42");
    assert_eq!(stored.location.as_deref(), Some("PLATFORM A"));
    assert_eq!(stored.dwell_time, 13);
    assert_eq!(stored.timestamp, record.timestamp);

    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_nullable_columns_round_trip() -> Result<()> {
    let pg = TestPostgres::start().await?;
    let store = PgDelayStore::new(pg.pool_clone());

    let record = DelayRecord::with_id("unknown");
    store.insert_if_absent(&record).await?;

    let stored = store.fetch("unknown").await?.expect("row unknown");
    assert_eq!(stored, record);
    assert!(store.fetch("missing").await?.is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_batch_against_postgres() -> Result<()> {
    init_test_tracing();
    let pg = TestPostgres::start().await?;
    let delays = PgDelayStore::new(pg.pool_clone());
    let statuses = MemoryStatusStore::new();
    let orchestrator =
        BatchOrchestrator::new(Arc::new(delays.clone()), Arc::new(statuses.clone()));

    let batch = vec![
        envelope(json!({ "Unnamed: 0": 1, "dwell_time": "12.7", "location": "  platform a " })),
        envelope(json!({ "Unnamed: 0": 2, "month": "December", "day": "Sunday" })),
        envelope(json!({ "Unnamed: 0": 1, "dwell_time": 99 })),
    ];

    let report = orchestrator.process_batch(&batch).await;
    assert_eq!(report.summary, BatchSummary { success: 3, failed: 0 });
    assert_eq!(report.already_present, 1);

    assert_eq!(delays.count().await?, 2);
    let first = delays.fetch("1").await?.expect("row 1");
    assert_eq!(first.dwell_time, 13);
    assert_eq!(first.location.as_deref(), Some("PLATFORM A"));

    let second = delays.fetch("2").await?.expect("row 2");
    assert_eq!((second.month, second.day), (Some(12), Some(7)));

    Ok(())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check() -> Result<()> {
    let pg = TestPostgres::start().await?;
    delays_etl::db::health_check(pg.pool()).await?;
    Ok(())
}
