//! Relational store connection pool

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Build a lazily-connecting pool.
///
/// Nothing is dialed until the first insert, so an unreachable database shows
/// up as a per-record load failure instead of failing the whole invocation.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_lazy(&config.url)?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply the bundled migrations (creates the `delays` table)
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EtlConfig;

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let mut config = EtlConfig::default().database;
        config.url = "postgresql://nobody@127.0.0.1:1/missing".to_string();

        assert!(create_pool(&config).is_ok());
    }

    #[tokio::test]
    async fn test_malformed_url_is_rejected() {
        let mut config = EtlConfig::default().database;
        config.url = "not a url".to_string();

        assert!(create_pool(&config).is_err());
    }
}
