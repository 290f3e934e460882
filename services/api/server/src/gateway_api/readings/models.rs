use chrono::{DateTime, Utc};
use postgres_models::models::readings::Reading;
use serde::Serialize;
use utoipa::ToSchema;

/// A stored meter reading.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingResponse {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub voltage: f64,
    pub current1: f64,
    pub current2: f64,
    pub current3: f64,
    pub total_current: f64,
    pub power1: f64,
    pub power2: f64,
    pub total_power: f64,
    pub relay1_state: bool,
    pub relay2_state: bool,
}

impl From<Reading> for ReadingResponse {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            timestamp: r.timestamp,
            voltage: r.voltage,
            current1: r.current1,
            current2: r.current2,
            current3: r.current3,
            total_current: r.total_current,
            power1: r.power1,
            power2: r.power2,
            total_power: r.total_power,
            relay1_state: r.relay1_state,
            relay2_state: r.relay2_state,
        }
    }
}
