//! Validate-and-publish loop

use delays_common::{legacy_record_id, RawRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{ProducerError, Result};
use crate::publisher::RecordPublisher;
use crate::validation;

/// Outcome counters for one producer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerReport {
    pub total_records: usize,
    pub success_count: usize,
    pub missing_incident_field: usize,
    pub missing_timestamp_field: usize,
}

/// Publish every record that carries the required fields.
///
/// Records missing a required field are logged once per missing field and
/// skipped. Publish failures are logged and left out of `success_count`.
pub async fn produce(records: &[RawRecord], publisher: &dyn RecordPublisher) -> ProducerReport {
    let mut report = ProducerReport {
        total_records: records.len(),
        ..ProducerReport::default()
    };

    for record in records {
        let record_id = legacy_record_id(record);

        let missing = validation::missing_fields(record);
        for field in &missing {
            // Data-quality alert; the record never reaches the stream
            error!(
                record_id = %record_id,
                field = *field,
                severity = "critical",
                "Record missing required field"
            );
            match *field {
                validation::INCIDENT_FIELD => report.missing_incident_field += 1,
                validation::TIMESTAMP_FIELD => report.missing_timestamp_field += 1,
                _ => {},
            }
        }
        if !missing.is_empty() {
            continue;
        }

        match publish_record(&record_id, record, publisher).await {
            Ok(()) => report.success_count += 1,
            Err(e) => warn!(record_id = %record_id, error = %e, "Failed to send record"),
        }
    }

    info!(
        stream = publisher.stream_name(),
        total_records = report.total_records,
        success_count = report.success_count,
        missing_incident_field = report.missing_incident_field,
        missing_timestamp_field = report.missing_timestamp_field,
        "Producer run finished"
    );

    report
}

async fn publish_record(
    record_id: &str,
    record: &RawRecord,
    publisher: &dyn RecordPublisher,
) -> Result<()> {
    let payload =
        serde_json::to_vec(&Value::Object(record.clone())).map_err(|source| {
            ProducerError::Serialize {
                record_id: record_id.to_string(),
                source,
            }
        })?;

    publisher.publish(record_id, &payload).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::publisher::MemoryPublisher;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_missing_fields_are_counted_and_skipped() {
        let publisher = MemoryPublisher::new("train-stream");
        let records = vec![
            raw(json!({ "Unnamed: 0": 0, "is_incident": true, "timestamp": "2023-01-01" })),
            raw(json!({ "Unnamed: 0": 1, "timestamp": "2023-01-01" })),
            raw(json!({ "Unnamed: 0": 2 })),
        ];

        let report = produce(&records, &publisher).await;

        assert_eq!(
            report,
            ProducerReport {
                total_records: 3,
                success_count: 1,
                missing_incident_field: 2,
                missing_timestamp_field: 1,
            }
        );
        assert_eq!(publisher.published().len(), 1);
        assert_eq!(publisher.published()[0].partition_key, "0");
    }

    #[tokio::test]
    async fn test_publish_failure_is_not_a_success() {
        let publisher = MemoryPublisher::new("train-stream");
        publisher.reject("7");
        let records = vec![raw(json!({ "Unnamed: 0": 7, "is_incident": false, "timestamp": null }))];

        let report = produce(&records, &publisher).await;

        assert_eq!(report.total_records, 1);
        assert_eq!(report.success_count, 0);
        assert!(publisher.published().is_empty());
    }

    #[test]
    fn test_report_wire_format() {
        let report = ProducerReport {
            total_records: 4,
            success_count: 2,
            missing_incident_field: 1,
            missing_timestamp_field: 1,
        };
        assert_eq!(
            serde_json::to_value(report).unwrap(),
            json!({
                "total_records": 4,
                "success_count": 2,
                "missing_incident_field": 1,
                "missing_timestamp_field": 1
            })
        );
    }
}
