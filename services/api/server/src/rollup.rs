//! Background job that keeps `daily_summary` up to date.
//!
//! Each pass recomputes the previous and the current UTC day, so late
//! readings for yesterday are still picked up after midnight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use postgres_models::models::daily_summary::DailySummary;
use tokio::time::{MissedTickBehavior, interval};

use crate::shutdown::ShutdownCoordinator;
use crate::storage::{ReadingStore, StorageError};

pub struct DailySummaryRollup {
    store: Arc<dyn ReadingStore>,
    interval: Duration,
}

impl DailySummaryRollup {
    pub fn new(store: Arc<dyn ReadingStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Days recomputed by a pass running at `now`, oldest first.
    pub fn days_to_refresh(now: DateTime<Utc>) -> [NaiveDate; 2] {
        let today = now.date_naive();
        [today - TimeDelta::days(1), today]
    }

    /// Recompute the summaries for yesterday and today. Days without readings
    /// are skipped.
    pub async fn run_once(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailySummary>, StorageError> {
        let mut written = Vec::new();
        for day in Self::days_to_refresh(now) {
            match self.store.rollup_day(day).await? {
                Some(summary) => {
                    tracing::debug!(
                        %day,
                        reading_count = summary.reading_count,
                        total_energy_kwh = summary.total_energy_kwh,
                        "Daily summary updated"
                    );
                    written.push(summary);
                }
                None => tracing::debug!(%day, "No readings, summary skipped"),
            }
        }
        Ok(written)
    }

    /// Run a pass immediately and then on every tick until shutdown starts.
    pub async fn run(self, shutdown: Arc<ShutdownCoordinator>) {
        tracing::info!(
            "Daily summary rollup started (interval: {}s)",
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.wait_for_shutdown() => break,
                _ = ticker.tick() => {}
            }

            if shutdown.is_shutting_down() {
                break;
            }

            match self.run_once(Utc::now()).await {
                Ok(written) => tracing::info!(
                    days = written.len(),
                    "Daily summary rollup finished"
                ),
                Err(e) => tracing::error!("Daily summary rollup failed: {}", e),
            }
        }

        tracing::info!("Daily summary rollup stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockReadingStore;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn summary(date: NaiveDate) -> DailySummary {
        DailySummary {
            id: 1,
            date,
            total_energy_kwh: 0.5,
            avg_voltage: Some(230.0),
            avg_current: Some(1.0),
            max_power: Some(300.0),
            min_power: Some(100.0),
            reading_count: 12,
        }
    }

    #[test]
    fn refreshes_yesterday_and_today_in_utc() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 5, 0).unwrap();
        assert_eq!(
            DailySummaryRollup::days_to_refresh(now),
            [
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn empty_days_are_skipped() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let today = now.date_naive();

        let mut store = MockReadingStore::new();
        store
            .expect_rollup_day()
            .times(2)
            .returning(move |day| {
                Ok((day == today).then(|| summary(day)))
            });

        let rollup =
            DailySummaryRollup::new(Arc::new(store), Duration::from_secs(60));
        let written = rollup.run_once(now).await.unwrap();

        assert_eq!(written, vec![summary(today)]);
    }

    #[tokio::test]
    async fn storage_errors_are_returned() {
        let mut store = MockReadingStore::new();
        store.expect_rollup_day().times(1).returning(|_| {
            Err(StorageError::Connection("pool timed out".to_string()))
        });

        let rollup =
            DailySummaryRollup::new(Arc::new(store), Duration::from_secs(60));
        assert!(rollup.run_once(Utc::now()).await.is_err());
    }
}
