use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::storage::ReadingStore;

const POSTGRES_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Debug)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub shutting_down: bool,
    pub components: HashMap<String, ComponentHealth>,
}

pub async fn handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let mut components = HashMap::new();
    components.insert(
        "postgres".to_string(),
        check_postgres(state.readings.as_ref()).await,
    );

    let is_shutting_down = state.shutdown.is_shutting_down();
    let any_unhealthy = components
        .values()
        .any(|c| c.status == HealthStatus::Unhealthy);

    let (overall, status_code) = if is_shutting_down || any_unhealthy {
        (HealthStatus::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)
    } else {
        (HealthStatus::Healthy, StatusCode::OK)
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall,
            shutting_down: is_shutting_down,
            components,
        }),
    )
}

async fn check_postgres(store: &dyn ReadingStore) -> ComponentHealth {
    let start = Instant::now();
    let result = tokio::time::timeout(POSTGRES_TIMEOUT, store.ping()).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(())) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        },
        Ok(Err(e)) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: Some(latency_ms),
            error: Some(e.to_string()),
        },
        Err(_) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: Some(latency_ms),
            error: Some("timeout".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MockReadingStore, StorageError};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reachable_store_is_healthy() {
        let mut store = MockReadingStore::new();
        store.expect_ping().returning(|| Ok(()));

        let health = check_postgres(&store).await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.error.is_none());
    }

    #[tokio::test]
    async fn failing_store_reports_the_error() {
        let mut store = MockReadingStore::new();
        store.expect_ping().returning(|| {
            Err(StorageError::Connection("connection refused".to_string()))
        });

        let health = check_postgres(&store).await;
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(
            health.error.as_deref(),
            Some("Failed to get database connection: connection refused")
        );
    }
}
