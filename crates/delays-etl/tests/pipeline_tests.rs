//! End-to-end batch processing against in-memory stores

mod common;

use chrono::NaiveDate;
use common::{envelope, init_test_tracing};
use delays_etl::lambda::{handle_event, KinesisEvent};
use delays_etl::store::{MemoryDelayStore, MemoryStatusStore};
use delays_etl::{BatchOrchestrator, BatchSummary, ProcessingStatus, StatusEntry, StreamEnvelope};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

fn setup() -> (BatchOrchestrator, MemoryDelayStore, MemoryStatusStore) {
    init_test_tracing();
    let delays = MemoryDelayStore::new();
    let statuses = MemoryStatusStore::new();
    let orchestrator =
        BatchOrchestrator::new(Arc::new(delays.clone()), Arc::new(statuses.clone()));
    (orchestrator, delays, statuses)
}

#[tokio::test]
async fn test_full_record_is_normalized_and_loaded() {
    let (orchestrator, delays, statuses) = setup();

    let report = orchestrator
        .process_batch(&[envelope(json!({
            "Unnamed: 0": 5,
            "year": 2024,
            "month": "March",
            "day": "Friday",
            "location_hour": 9,
            "location": " hall b ",
            "dwell_time": "7.4",
            "is_incident": true
        }))])
        .await;

    assert_eq!(report.summary, BatchSummary { success: 1, failed: 0 });

    let row = delays.get("5").expect("row for record 5");
    assert_eq!(
        row.timestamp,
        NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(9, 0, 0))
    );
    assert_eq!(row.month, Some(3));
    assert_eq!(row.day, Some(5));
    assert_eq!(row.location.as_deref(), Some("HALL B"));
    assert_eq!(row.dwell_time, 7);
    assert_eq!(row.incident, Some(true));

    assert_eq!(statuses.get("5"), Some(StatusEntry::success("5")));
}

#[tokio::test]
async fn test_bad_base64_fails_only_its_record() {
    let (orchestrator, delays, statuses) = setup();

    let report = orchestrator
        .process_batch(&[
            envelope(json!({ "Unnamed: 0": 1, "dwell_time": 4 })),
            StreamEnvelope::new("%%% not base64 %%%"),
        ])
        .await;

    assert_eq!(report.summary, BatchSummary { success: 1, failed: 1 });
    assert_eq!(delays.len(), 1);
    assert_eq!(statuses.len(), 2);

    assert_eq!(statuses.get("1").map(|e| e.status), Some(ProcessingStatus::Success));
    let unknown = statuses.get("unknown").expect("error status for undecodable record");
    assert_eq!(unknown.status, ProcessingStatus::Error);
    assert!(unknown.error.unwrap_or_default().starts_with("Decode failed"));
}

#[tokio::test]
async fn test_reprocessing_overwrites_status_and_keeps_row() {
    let (orchestrator, delays, statuses) = setup();

    delays.fail_all("connection reset");
    let first = orchestrator
        .process_batch(&[envelope(json!({ "Unnamed: 0": 8, "location": "a" }))])
        .await;
    assert_eq!(first.summary.failed, 1);
    assert_eq!(statuses.get("8").map(|e| e.status), Some(ProcessingStatus::Error));

    delays.recover();
    let second = orchestrator
        .process_batch(&[envelope(json!({ "Unnamed: 0": 8, "location": "a" }))])
        .await;
    assert_eq!(second.summary.success, 1);
    assert_eq!(statuses.get("8"), Some(StatusEntry::success("8")));

    let third = orchestrator
        .process_batch(&[envelope(json!({ "Unnamed: 0": 8, "location": "b" }))])
        .await;
    assert_eq!(third.summary.success, 1);
    assert_eq!(third.already_present, 1);
    assert_eq!(delays.len(), 1);
    assert_eq!(delays.get("8").and_then(|r| r.location), Some("A".to_string()));
    assert_eq!(statuses.len(), 1);
}

#[tokio::test]
async fn test_counts_cover_every_record() {
    let (orchestrator, delays, _statuses) = setup();
    delays.fail_record("3");

    let batch = vec![
        envelope(json!({ "Unnamed: 0": 1 })),
        StreamEnvelope::default(),
        envelope(json!({ "Unnamed: 0": 3 })),
        StreamEnvelope::new("WzEsIDJd"), // [1, 2]
        envelope(json!({ "Unnamed: 0": 1 })),
        envelope(json!({ "no_id": true })),
    ];

    let report = orchestrator.process_batch(&batch).await;

    assert_eq!(report.summary.total(), batch.len());
    assert_eq!(report.summary, BatchSummary { success: 3, failed: 3 });
    assert_eq!(report.inserted, 2);
    assert_eq!(report.already_present, 1);
    assert!(delays.get("unknown").is_some());
}

#[tokio::test]
async fn test_status_store_outage_does_not_halt_batch() {
    let (orchestrator, delays, statuses) = setup();
    statuses.fail_all("ProvisionedThroughputExceededException");

    let report = orchestrator
        .process_batch(&[
            envelope(json!({ "Unnamed: 0": 1 })),
            envelope(json!({ "Unnamed: 0": 2 })),
        ])
        .await;

    assert_eq!(report.summary, BatchSummary { success: 0, failed: 2 });
    assert_eq!(report.status_failures.len(), 2);
    assert_eq!(delays.len(), 2);
}

#[tokio::test]
async fn test_handler_returns_summary_body() {
    let (orchestrator, _delays, statuses) = setup();

    let event: KinesisEvent = serde_json::from_value(json!({
        "Records": [
            { "kinesis": { "data": envelope(json!({ "Unnamed: 0": 11 })).payload, "sequenceNumber": "1" } },
            { "kinesis": { "data": "!!!!", "sequenceNumber": "2" } },
            { "eventID": "shardId-000000000000:3" }
        ]
    }))
    .expect("valid event");

    let response = handle_event(&orchestrator, event).await.expect("handler result");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"success":1,"failed":2}"#);
    assert_eq!(statuses.get("11").map(|e| e.status), Some(ProcessingStatus::Success));
}

/// Log sink shared between the subscriber and the assertions
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_handler_surfaces_unrecorded_status_failures() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let delays = MemoryDelayStore::new();
    let statuses = MemoryStatusStore::new();
    statuses.fail_record("4");
    let orchestrator =
        BatchOrchestrator::new(Arc::new(delays.clone()), Arc::new(statuses.clone()));

    let event: KinesisEvent = serde_json::from_value(json!({
        "Records": [
            { "kinesis": { "data": envelope(json!({ "Unnamed: 0": 4 })).payload } },
            { "kinesis": { "data": envelope(json!({ "Unnamed: 0": 5 })).payload } }
        ]
    }))
    .expect("valid event");

    let response = handle_event(&orchestrator, event).await.expect("handler result");
    assert_eq!(response.body, r#"{"success":1,"failed":1}"#);

    let output = logs.contents();
    assert!(output.contains("Failed records missing from the status store"));
    assert!(output.contains("status_failures=1"));
    assert!(output.contains(r#"record_ids=["4"]"#));
}
