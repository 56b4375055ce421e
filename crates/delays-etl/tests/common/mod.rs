//! Shared helpers for delays-etl integration tests
//!
//! - [`TestPostgres`]: PostgreSQL container with migrations applied
//! - [`envelope`]/[`raw`]: build stream envelopes from JSON literals

#![allow(dead_code)]

use anyhow::{Context, Result};
use delays_common::RawRecord;
use delays_etl::decoder::encode_payload;
use delays_etl::StreamEnvelope;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::{debug, info};

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// PostgreSQL test container wrapper with the `delays` table created
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string =
            format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        debug!("PostgreSQL connection: {}", connection_string);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;

        delays_etl::db::run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }
}

// ============================================================================
// Envelope builders
// ============================================================================

pub fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn envelope(value: Value) -> StreamEnvelope {
    StreamEnvelope::new(encode_payload(&raw(value)))
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("delays_etl=debug")
        .with_test_writer()
        .try_init();
}
