//! Postgres-backed delay store

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use super::{DelayStore, LoadOutcome};
use crate::error::LoadError;
use crate::models::DelayRecord;

const INSERT_DELAY: &str = r#"
    INSERT INTO delays (
        record_id, "timestamp", flight_id, location, location_hour,
        location_part_of_day, delay_category, dwell_time, incident,
        year, month, day
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (record_id) DO NOTHING
"#;

const SELECT_DELAY: &str = r#"
    SELECT
        record_id, "timestamp", flight_id, location, location_hour,
        location_part_of_day, delay_category, dwell_time, incident,
        year, month, day
    FROM delays
    WHERE record_id = $1
"#;

/// Loader writing into the `delays` table
#[derive(Clone)]
pub struct PgDelayStore {
    pool: PgPool,
}

impl PgDelayStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read back a stored row
    pub async fn fetch(&self, record_id: &str) -> Result<Option<DelayRecord>, LoadError> {
        let row = sqlx::query(SELECT_DELAY)
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut record = DelayRecord::with_id(row.try_get::<String, _>("record_id")?);
        record.timestamp = row.try_get("timestamp")?;
        record.flight_id = row.try_get("flight_id")?;
        record.location = row.try_get("location")?;
        record.location_hour = row.try_get("location_hour")?;
        record.location_part_of_day = row.try_get("location_part_of_day")?;
        record.delay_category = row.try_get("delay_category")?;
        record.dwell_time = row.try_get("dwell_time")?;
        record.incident = row.try_get("incident")?;
        record.year = row.try_get("year")?;
        record.month = row.try_get("month")?;
        record.day = row.try_get("day")?;

        Ok(Some(record))
    }

    pub async fn count(&self) -> Result<i64, LoadError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delays")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl DelayStore for PgDelayStore {
    #[instrument(skip(self, record), fields(record_id = %record.record_id))]
    async fn insert_if_absent(&self, record: &DelayRecord) -> Result<LoadOutcome, LoadError> {
        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(INSERT_DELAY)
            .bind(&record.record_id)
            .bind(record.timestamp)
            .bind(&record.flight_id)
            .bind(&record.location)
            .bind(record.location_hour)
            .bind(&record.location_part_of_day)
            .bind(&record.delay_category)
            .bind(record.dwell_time)
            .bind(record.incident)
            .bind(record.year)
            .bind(record.month)
            .bind(record.day)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let outcome = if result.rows_affected() == 0 {
            LoadOutcome::AlreadyPresent
        } else {
            LoadOutcome::Inserted
        };
        debug!(?outcome, "Delay row written");

        Ok(outcome)
    }
}
