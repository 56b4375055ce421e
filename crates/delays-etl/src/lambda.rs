//! Lambda entry point for Kinesis-triggered invocations
//!
//! The event is deserialized leniently: records without a `kinesis` block or
//! without `data` become empty envelopes and fail individually in the decoder.

use lambda_runtime::{service_fn, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::EtlConfig;
use crate::db;
use crate::models::{BatchSummary, StreamEnvelope};
use crate::orchestrator::BatchOrchestrator;
use crate::store::{DynamoStatusStore, PgDelayStore};

/// Kinesis stream event as delivered to the function
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KinesisEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<KinesisEventRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KinesisEventRecord {
    #[serde(default)]
    pub kinesis: Option<KinesisRecord>,
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisRecord {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

impl KinesisEvent {
    /// One envelope per stream record, in arrival order
    pub fn envelopes(&self) -> Vec<StreamEnvelope> {
        self.records
            .iter()
            .map(|record| match &record.kinesis {
                Some(kinesis) => StreamEnvelope {
                    payload: kinesis.data.clone(),
                    partition_key: kinesis.partition_key.clone(),
                    sequence_number: kinesis.sequence_number.clone(),
                },
                None => StreamEnvelope::default(),
            })
            .collect()
    }
}

/// Invocation result: `{"statusCode": 200, "body": "{\"success\":N,\"failed\":M}"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn from_summary(summary: &BatchSummary) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(summary)?,
        })
    }
}

/// Run one batch through the orchestrator
pub async fn handle_event(
    orchestrator: &BatchOrchestrator,
    event: KinesisEvent,
) -> Result<HandlerResponse, lambda_runtime::Error> {
    let envelopes = event.envelopes();
    info!(records = envelopes.len(), "Received stream batch");

    let report = orchestrator.process_batch(&envelopes).await;
    if !report.status_failures.is_empty() {
        let record_ids: Vec<&str> = report
            .status_failures
            .iter()
            .map(|failure| failure.record_id.as_str())
            .collect();
        error!(
            status_failures = report.status_failures.len(),
            record_ids = ?record_ids,
            "Failed records missing from the status store"
        );
    }

    Ok(HandlerResponse::from_summary(&report.summary)?)
}

/// Build the stores once and serve invocations until the runtime shuts down
pub async fn run() -> Result<(), lambda_runtime::Error> {
    let config = EtlConfig::load()?;

    let pool = db::create_pool(&config.database)?;
    if config.database.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let statuses = DynamoStatusStore::from_config(&config.status_store).await;
    info!(
        status_table = statuses.table_name(),
        "Status store configured"
    );

    let orchestrator = Arc::new(BatchOrchestrator::new(
        Arc::new(PgDelayStore::new(pool)),
        Arc::new(statuses),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<KinesisEvent>| {
        let orchestrator = Arc::clone(&orchestrator);
        async move { handle_event(&orchestrator, event.payload).await }
    }))
    .await
}
