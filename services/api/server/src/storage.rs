//! Datastore access used by the HTTP handlers and the rollup job.
//!
//! Handlers depend on [`ReadingStore`] rather than on the pool so the router
//! can be driven against an in-memory store in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel_async::RunQueryDsl;
use futures::FutureExt;
use postgres_models::connection::{
    Pool, WithConnectionError, shutdown_pool_with_timeout, with_connection,
    with_transaction,
};
use postgres_models::models::daily_summary::DailySummary;
use postgres_models::models::readings::{NewReading, Reading, ReadingStats};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to get database connection: {0}")]
    Connection(String),

    #[error("Database operation failed: {0}")]
    Operation(#[from] diesel::result::Error),
}

impl From<WithConnectionError<diesel::result::Error>> for StorageError {
    fn from(e: WithConnectionError<diesel::result::Error>) -> Self {
        match e {
            WithConnectionError::Pool(e) => {
                StorageError::Connection(e.to_string())
            }
            WithConnectionError::Operation(e) => StorageError::Operation(e),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert_reading(
        &self,
        reading: NewReading,
    ) -> Result<(), StorageError>;

    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError>;

    /// Readings at or after `from`, oldest first.
    async fn readings_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError>;

    async fn reading_stats(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ReadingStats, StorageError>;

    /// Recompute and store the summary of one UTC day. Returns `None` when the
    /// day has no readings, in which case nothing is written.
    async fn rollup_day(
        &self,
        day: NaiveDate,
    ) -> Result<Option<DailySummary>, StorageError>;

    /// Most recent summaries, newest day first.
    async fn daily_summaries(
        &self,
        limit: i64,
    ) -> Result<Vec<DailySummary>, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;

    async fn close(&self, timeout: Duration);
}

#[derive(Clone)]
pub struct PgReadingStore {
    pool: Pool,
}

impl PgReadingStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert_reading(
        &self,
        reading: NewReading,
    ) -> Result<(), StorageError> {
        with_connection(&self.pool, |mut conn| async move {
            Reading::insert(&reading, &mut conn).await
        })
        .await?;
        Ok(())
    }

    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError> {
        Ok(with_connection(&self.pool, |mut conn| async move {
            Reading::latest(&mut conn).await
        })
        .await?)
    }

    async fn readings_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError> {
        Ok(with_connection(&self.pool, |mut conn| async move {
            Reading::since(from, &mut conn).await
        })
        .await?)
    }

    async fn reading_stats(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ReadingStats, StorageError> {
        Ok(with_connection(&self.pool, |mut conn| async move {
            Reading::stats(from, to, &mut conn).await
        })
        .await?)
    }

    async fn rollup_day(
        &self,
        day: NaiveDate,
    ) -> Result<Option<DailySummary>, StorageError> {
        Ok(with_transaction(&self.pool, |conn| {
            DailySummary::rollup(day, conn).boxed()
        })
        .await?)
    }

    async fn daily_summaries(
        &self,
        limit: i64,
    ) -> Result<Vec<DailySummary>, StorageError> {
        Ok(with_connection(&self.pool, |mut conn| async move {
            DailySummary::get_latest(limit, &mut conn).await
        })
        .await?)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        with_connection(&self.pool, |mut conn| async move {
            diesel::sql_query("SELECT 1").execute(&mut conn).await
        })
        .await?;
        Ok(())
    }

    async fn close(&self, timeout: Duration) {
        match tokio::time::timeout(
            timeout,
            shutdown_pool_with_timeout(Arc::new(self.pool.clone()), timeout),
        )
        .await
        {
            Ok(Ok(_)) => tracing::info!("Database pool shutdown completed"),
            Ok(Err(e)) => {
                tracing::warn!("Database pool shutdown error: {:?}", e)
            }
            Err(_) => tracing::warn!("Database pool shutdown timed out"),
        }
    }
}
