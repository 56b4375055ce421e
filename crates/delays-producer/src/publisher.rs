//! Stream publishers

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument};

use crate::error::{ProducerError, Result};

/// Default stream the consumer Lambda is subscribed to
pub const DEFAULT_STREAM_NAME: &str = "train-stream";

/// Destination for serialized records
#[async_trait]
pub trait RecordPublisher: Send + Sync {
    fn stream_name(&self) -> &str;

    /// Publish one JSON payload under the given partition key
    async fn publish(&self, partition_key: &str, payload: &[u8]) -> Result<()>;
}

/// Kinesis data stream publisher
#[derive(Clone)]
pub struct KinesisPublisher {
    client: Client,
    stream_name: String,
}

impl KinesisPublisher {
    pub fn new(client: Client, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
        }
    }

    pub async fn connect(
        stream_name: impl Into<String>,
        region: impl Into<String>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.into()));
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), stream_name)
    }
}

#[async_trait]
impl RecordPublisher for KinesisPublisher {
    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    #[instrument(skip(self, payload), fields(stream = %self.stream_name, bytes = payload.len()))]
    async fn publish(&self, partition_key: &str, payload: &[u8]) -> Result<()> {
        let output = self
            .client
            .put_record()
            .stream_name(&self.stream_name)
            .partition_key(partition_key)
            .data(Blob::new(payload))
            .send()
            .await
            .map_err(|e| ProducerError::Publish {
                record_id: partition_key.to_string(),
                stream: self.stream_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(
            shard_id = output.shard_id(),
            sequence_number = output.sequence_number(),
            "Record published"
        );
        Ok(())
    }
}

/// A record captured by [`MemoryPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRecord {
    pub partition_key: String,
    pub payload: Vec<u8>,
}

/// Publisher that keeps records in memory; clones share state
#[derive(Clone, Default)]
pub struct MemoryPublisher {
    stream_name: String,
    published: Arc<Mutex<Vec<PublishedRecord>>>,
    rejected_keys: Arc<Mutex<Vec<String>>>,
}

impl MemoryPublisher {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Self::default()
        }
    }

    /// Reject publishes for the given partition key
    pub fn reject(&self, partition_key: impl Into<String>) {
        self.rejected_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(partition_key.into());
    }

    pub fn published(&self) -> Vec<PublishedRecord> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RecordPublisher for MemoryPublisher {
    fn stream_name(&self) -> &str {
        &self.stream_name
    }

    async fn publish(&self, partition_key: &str, payload: &[u8]) -> Result<()> {
        let rejected = self
            .rejected_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|key| key == partition_key);
        if rejected {
            return Err(ProducerError::Publish {
                record_id: partition_key.to_string(),
                stream: self.stream_name.clone(),
                message: "rejected".to_string(),
            });
        }

        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedRecord {
                partition_key: partition_key.to_string(),
                payload: payload.to_vec(),
            });
        Ok(())
    }
}
