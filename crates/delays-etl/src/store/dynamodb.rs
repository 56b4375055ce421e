//! DynamoDB-backed status store

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::StatusStore;
use crate::config::StatusStoreConfig;
use crate::error::StatusError;
use crate::models::StatusEntry;

/// Status tracker writing one item per record into a DynamoDB table
#[derive(Clone)]
pub struct DynamoStatusStore {
    client: Client,
    table_name: String,
}

impl DynamoStatusStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a client from the ambient AWS configuration plus overrides
    pub async fn from_config(config: &StatusStoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Item attributes for a status entry. `error` is omitted when absent.
pub(crate) fn status_item(entry: &StatusEntry) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (
            "record_id".to_string(),
            AttributeValue::S(entry.record_id.clone()),
        ),
        (
            "status".to_string(),
            AttributeValue::S(entry.status.as_str().to_string()),
        ),
    ]);

    if let Some(message) = &entry.error {
        item.insert("error".to_string(), AttributeValue::S(message.clone()));
    }

    item
}

#[async_trait]
impl StatusStore for DynamoStatusStore {
    #[instrument(skip(self, entry), fields(record_id = %entry.record_id, status = %entry.status))]
    async fn put_status(&self, entry: &StatusEntry) -> Result<(), StatusError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(status_item(entry)))
            .send()
            .await
            .map_err(|e| StatusError::Put {
                record_id: entry.record_id.clone(),
                table: self.table_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Status entry written");
        Ok(())
    }
}
