//! Batch orchestration
//!
//! Drives every envelope of a batch through decode → normalize → load → status,
//! isolating failures per record. A batch never aborts: each record ends up
//! counted exactly once as a success or a failure.

use delays_common::{legacy_record_id, UNKNOWN_RECORD_ID};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::decoder;
use crate::error::PipelineResult;
use crate::models::{BatchSummary, StreamEnvelope};
use crate::normalizer;
use crate::store::{DelayStore, LoadOutcome, StatusStore};

/// An error status that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFailure {
    pub record_id: String,
    /// The pipeline error that was being recorded
    pub pipeline_error: String,
    /// Why the status store rejected it
    pub status_error: String,
}

/// Detailed result of a batch; [`BatchReport::summary`] is what callers return
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub inserted: usize,
    pub already_present: usize,
    pub status_failures: Vec<StatusFailure>,
}

pub struct BatchOrchestrator {
    delays: Arc<dyn DelayStore>,
    statuses: Arc<dyn StatusStore>,
}

impl BatchOrchestrator {
    pub fn new(delays: Arc<dyn DelayStore>, statuses: Arc<dyn StatusStore>) -> Self {
        Self { delays, statuses }
    }

    /// Process a batch in order, one record at a time
    pub async fn process_batch(&self, envelopes: &[StreamEnvelope]) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, envelope) in envelopes.iter().enumerate() {
            let span = info_span!(
                "record",
                index,
                sequence_number = envelope.sequence_number.as_deref().unwrap_or("-"),
            );
            self.process_record(envelope, &mut report)
                .instrument(span)
                .await;
        }

        if report.status_failures.is_empty() {
            info!(
                success = report.summary.success,
                failed = report.summary.failed,
                "Batch processed"
            );
        } else {
            warn!(
                success = report.summary.success,
                failed = report.summary.failed,
                status_failures = report.status_failures.len(),
                "Batch processed with unrecorded failures"
            );
        }

        report
    }

    async fn process_record(&self, envelope: &StreamEnvelope, report: &mut BatchReport) {
        let mut record_id = None;

        match self.run_stages(envelope, &mut record_id).await {
            Ok(outcome) => {
                report.summary.success += 1;
                match outcome {
                    LoadOutcome::Inserted => report.inserted += 1,
                    LoadOutcome::AlreadyPresent => report.already_present += 1,
                }
            },
            Err(err) => {
                report.summary.failed += 1;

                let record_id = record_id.unwrap_or_else(|| UNKNOWN_RECORD_ID.to_string());
                let message = err.to_string();
                error!(
                    record_id = %record_id,
                    stage = err.stage(),
                    error = %message,
                    "Failed to process record"
                );

                if let Err(status_err) = self.statuses.record_error(&record_id, &message).await {
                    error!(
                        record_id = %record_id,
                        error = %status_err,
                        "Failed to record error status"
                    );
                    report.status_failures.push(StatusFailure {
                        record_id,
                        pipeline_error: message,
                        status_error: status_err.to_string(),
                    });
                }
            },
        }
    }

    /// Run one record through every stage; `record_id` is filled in as soon as
    /// it is known so failures can be attributed.
    async fn run_stages(
        &self,
        envelope: &StreamEnvelope,
        record_id: &mut Option<String>,
    ) -> PipelineResult<LoadOutcome> {
        let raw = decoder::decode(envelope)?;
        *record_id = Some(legacy_record_id(&raw));

        let record = normalizer::normalize(raw);
        debug!(record = ?record, "Transformed record");

        let outcome = self.delays.insert_if_absent(&record).await?;
        if outcome == LoadOutcome::AlreadyPresent {
            debug!(record_id = %record.record_id, "Record already loaded, keeping stored row");
        }

        self.statuses.record_success(&record.record_id).await?;
        Ok(outcome)
    }
}
