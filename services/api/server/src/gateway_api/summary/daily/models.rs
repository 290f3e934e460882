use chrono::NaiveDate;
use postgres_models::models::daily_summary::DailySummary;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_SUMMARY_DAYS: i64 = 7;

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailySummaryParams {
    /// Number of most recent days to return.
    #[validate(range(min = 1, max = 366, message = "days must be between 1 and 366"))]
    #[param(default = 7, minimum = 1, maximum = 366)]
    pub days: Option<i64>,
}

impl DailySummaryParams {
    pub fn days(&self) -> i64 {
        self.days.unwrap_or(DEFAULT_SUMMARY_DAYS)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    pub total_energy_kwh: f64,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub max_power: Option<f64>,
    pub min_power: Option<f64>,
    pub reading_count: i64,
}

impl From<DailySummary> for DailySummaryResponse {
    fn from(s: DailySummary) -> Self {
        Self {
            date: s.date,
            total_energy_kwh: s.total_energy_kwh,
            avg_voltage: s.avg_voltage,
            avg_current: s.avg_current,
            max_power: s.max_power,
            min_power: s.min_power,
            reading_count: s.reading_count,
        }
    }
}
