#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, NaiveDate, Utc};
use energy_gateway::metrics::ServerMetrics;
use energy_gateway::storage::{ReadingStore, StorageError};
use energy_gateway::{AppState, Config};
use parking_lot::Mutex;
use postgres_models::models::daily_summary::{
    DailySummary, NewDailySummary, utc_day_bounds,
};
use postgres_models::models::readings::{NewReading, Reading, ReadingStats};
use telemetry::metrics::Telemetry;

/// `ReadingStore` backed by vectors, with the same ordering and aggregation
/// rules as the PostgreSQL queries.
#[derive(Default)]
pub struct InMemoryReadingStore {
    readings: Mutex<Vec<Reading>>,
    summaries: Mutex<Vec<DailySummary>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
}

impl InMemoryReadingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every operation fail as if the pool could not hand out a
    /// connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Store a reading with an explicit timestamp.
    pub fn seed(&self, timestamp: DateTime<Utc>, reading: NewReading) -> Reading {
        let stored = Reading {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            timestamp,
            voltage: reading.voltage,
            current1: reading.current1,
            current2: reading.current2,
            current3: reading.current3,
            total_current: reading.total_current,
            power1: reading.power1,
            power2: reading.power2,
            total_power: reading.total_power,
            relay1_state: reading.relay1_state,
            relay2_state: reading.relay2_state,
        };
        self.readings.lock().push(stored.clone());
        stored
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.readings.lock().clone()
    }

    pub fn summaries(&self) -> Vec<DailySummary> {
        self.summaries.lock().clone()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection(
                "timed out waiting for connection".to_string(),
            ));
        }
        Ok(())
    }

    fn compute_stats(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> ReadingStats {
        let readings = self.readings.lock();
        let window: Vec<&Reading> = readings
            .iter()
            .filter(|r| r.timestamp >= from && to.is_none_or(|to| r.timestamp < to))
            .collect();

        if window.is_empty() {
            return ReadingStats::default();
        }

        let n = window.len() as f64;
        let sum = |f: fn(&Reading) -> f64| window.iter().map(|r| f(r)).sum::<f64>();
        let power = window.iter().map(|r| r.total_power);

        ReadingStats {
            total_readings: window.len() as i64,
            avg_voltage: Some(sum(|r| r.voltage) / n),
            avg_current: Some(sum(|r| r.total_current) / n),
            avg_power: Some(sum(|r| r.total_power) / n),
            max_power: power.clone().reduce(f64::max),
            min_power: power.reduce(f64::min),
            total_power_sum: Some(sum(|r| r.total_power)),
        }
    }
}

#[async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn insert_reading(
        &self,
        reading: NewReading,
    ) -> Result<(), StorageError> {
        self.check_available()?;
        self.seed(Utc::now(), reading);
        Ok(())
    }

    async fn latest_reading(&self) -> Result<Option<Reading>, StorageError> {
        self.check_available()?;
        Ok(self
            .readings
            .lock()
            .iter()
            .max_by_key(|r| (r.timestamp, r.id))
            .cloned())
    }

    async fn readings_since(
        &self,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reading>, StorageError> {
        self.check_available()?;
        let mut readings: Vec<Reading> = self
            .readings
            .lock()
            .iter()
            .filter(|r| r.timestamp >= from)
            .cloned()
            .collect();
        readings.sort_by_key(|r| (r.timestamp, r.id));
        Ok(readings)
    }

    async fn reading_stats(
        &self,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ReadingStats, StorageError> {
        self.check_available()?;
        Ok(self.compute_stats(from, to))
    }

    async fn rollup_day(
        &self,
        day: NaiveDate,
    ) -> Result<Option<DailySummary>, StorageError> {
        self.check_available()?;
        let (start, end) = utc_day_bounds(day);
        let stats = self.compute_stats(start, Some(end));
        if stats.total_readings == 0 {
            return Ok(None);
        }

        let entry = NewDailySummary::from_stats(day, &stats);
        let mut summaries = self.summaries.lock();
        let id = summaries
            .iter()
            .find(|s| s.date == day)
            .map(|s| s.id)
            .unwrap_or(summaries.len() as i32 + 1);
        summaries.retain(|s| s.date != day);

        let summary = DailySummary {
            id,
            date: entry.date,
            total_energy_kwh: entry.total_energy_kwh,
            avg_voltage: entry.avg_voltage,
            avg_current: entry.avg_current,
            max_power: entry.max_power,
            min_power: entry.min_power,
            reading_count: entry.reading_count,
        };
        summaries.push(summary.clone());
        Ok(Some(summary))
    }

    async fn daily_summaries(
        &self,
        limit: i64,
    ) -> Result<Vec<DailySummary>, StorageError> {
        self.check_available()?;
        let mut summaries = self.summaries.lock().clone();
        summaries.sort_by(|a, b| b.date.cmp(&a.date));
        summaries.truncate(limit.max(0) as usize);
        Ok(summaries)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.check_available()
    }

    async fn close(&self, _timeout: Duration) {}
}

pub fn test_config() -> Config {
    envy::from_iter(vec![(
        "DATABASE_PASSWORD".to_string(),
        "test".to_string(),
    )])
    .unwrap()
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryReadingStore>,
    pub state: AppState,
}

pub fn build_test_app() -> TestApp {
    let store = InMemoryReadingStore::new();
    let metrics = ServerMetrics::new(None).unwrap();
    let telemetry = Telemetry::new(Some(metrics));
    let state = AppState::new(store.clone(), test_config(), telemetry);

    let server = TestServer::new(energy_gateway::app(state.clone())).unwrap();

    TestApp {
        server,
        store,
        state,
    }
}

pub fn reading(total_power: f64) -> NewReading {
    NewReading {
        voltage: 230.0,
        current1: 1.0,
        current2: 2.0,
        current3: 0.5,
        total_current: 3.5,
        power1: total_power / 2.0,
        power2: total_power / 2.0,
        total_power,
        relay1_state: false,
        relay2_state: true,
    }
}
