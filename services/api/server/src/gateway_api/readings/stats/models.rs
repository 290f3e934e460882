use chrono::TimeDelta;
use postgres_models::models::readings::ReadingStats;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsParams {
    /// `day`, `week` or `month`. Anything else is treated as `day`.
    #[param(default = "day")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPeriod {
    #[default]
    Day,
    Week,
    Month,
}

impl StatsPeriod {
    pub fn parse(period: Option<&str>) -> Self {
        match period {
            Some("week") => StatsPeriod::Week,
            Some("month") => StatsPeriod::Month,
            _ => StatsPeriod::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatsPeriod::Day => "day",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
        }
    }

    pub fn window(self) -> TimeDelta {
        match self {
            StatsPeriod::Day => TimeDelta::days(1),
            StatsPeriod::Week => TimeDelta::days(7),
            StatsPeriod::Month => TimeDelta::days(30),
        }
    }
}

/// Aggregates over the trailing window. Averages and extremes are `null` when
/// the window holds no readings.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub period: &'static str,
    pub total_readings: i64,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub avg_power: Option<f64>,
    pub max_power: Option<f64>,
    pub min_power: Option<f64>,
    pub total_energy_kwh: f64,
}

impl StatsResponse {
    pub fn new(period: StatsPeriod, stats: &ReadingStats) -> Self {
        Self {
            period: period.as_str(),
            total_readings: stats.total_readings,
            avg_voltage: stats.avg_voltage,
            avg_current: stats.avg_current,
            avg_power: stats.avg_power,
            max_power: stats.max_power,
            min_power: stats.min_power,
            total_energy_kwh: stats.total_energy_kwh(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_periods_fall_back_to_day() {
        assert_eq!(StatsPeriod::parse(None), StatsPeriod::Day);
        assert_eq!(StatsPeriod::parse(Some("year")), StatsPeriod::Day);
        assert_eq!(StatsPeriod::parse(Some("WEEK")), StatsPeriod::Day);
        assert_eq!(StatsPeriod::parse(Some("week")), StatsPeriod::Week);
        assert_eq!(StatsPeriod::parse(Some("month")), StatsPeriod::Month);
    }

    #[test]
    fn windows_are_whole_days() {
        assert_eq!(StatsPeriod::Day.window().num_days(), 1);
        assert_eq!(StatsPeriod::Week.window().num_days(), 7);
        assert_eq!(StatsPeriod::Month.window().num_days(), 30);
    }

    #[test]
    fn empty_window_reports_zero_energy_and_null_extremes() {
        let response =
            StatsResponse::new(StatsPeriod::Week, &ReadingStats::default());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["period"], "week");
        assert_eq!(body["total_readings"], 0);
        assert_eq!(body["total_energy_kwh"], 0.0);
        assert!(body["max_power"].is_null());
    }
}
