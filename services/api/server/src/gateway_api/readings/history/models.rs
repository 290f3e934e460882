use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

pub const DEFAULT_HISTORY_HOURS: i64 = 24;
/// Ten years.
pub const MAX_HISTORY_HOURS: i64 = 87_600;

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Size of the trailing window in hours. Zero or negative yields an
    /// empty list.
    #[validate(range(
        max = 87_600,
        message = "hours must not exceed 87600 (ten years)"
    ))]
    #[param(default = 24, maximum = 87_600)]
    pub hours: Option<i64>,
}

impl HistoryParams {
    pub fn hours(&self) -> i64 {
        self.hours.unwrap_or(DEFAULT_HISTORY_HOURS)
    }

    /// Start of the window, or `None` when the window is empty.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let hours = self.hours();
        if hours <= 0 {
            return None;
        }

        TimeDelta::try_hours(hours).and_then(|span| now.checked_sub_signed(span))
    }
}
