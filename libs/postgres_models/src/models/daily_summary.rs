use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::readings::{Reading, ReadingStats};
use crate::schema::daily_summary;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, serde::Serialize)]
#[diesel(table_name = daily_summary)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DailySummary {
    pub id: i32,
    pub date: NaiveDate,
    pub total_energy_kwh: f64,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub max_power: Option<f64>,
    pub min_power: Option<f64>,
    pub reading_count: i64,
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = daily_summary)]
#[diesel(treat_none_as_null = true)]
pub struct NewDailySummary {
    pub date: NaiveDate,
    pub total_energy_kwh: f64,
    pub avg_voltage: Option<f64>,
    pub avg_current: Option<f64>,
    pub max_power: Option<f64>,
    pub min_power: Option<f64>,
    pub reading_count: i64,
}

/// Start (inclusive) and end (exclusive) of a UTC calendar day.
pub fn utc_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

impl NewDailySummary {
    pub fn from_stats(date: NaiveDate, stats: &ReadingStats) -> Self {
        Self {
            date,
            total_energy_kwh: stats.total_energy_kwh(),
            avg_voltage: stats.avg_voltage,
            avg_current: stats.avg_current,
            max_power: stats.max_power,
            min_power: stats.min_power,
            reading_count: stats.total_readings,
        }
    }
}

impl DailySummary {
    /// Insert the summary for its date, replacing any earlier rollup.
    pub async fn upsert(
        entry: &NewDailySummary,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(daily_summary::table)
            .values(entry)
            .on_conflict(daily_summary::date)
            .do_update()
            .set(entry)
            .returning(DailySummary::as_returning())
            .get_result(conn)
            .await
    }

    /// Recompute one UTC day from `readings` and upsert it. Days without
    /// readings are left untouched and yield `None`.
    pub async fn rollup(
        date: NaiveDate,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        let (start, end) = utc_day_bounds(date);
        let stats = Reading::stats(start, Some(end), conn).await?;
        if stats.total_readings == 0 {
            return Ok(None);
        }

        let entry = NewDailySummary::from_stats(date, &stats);
        Self::upsert(&entry, conn).await.map(Some)
    }

    /// Get the last N summaries ordered by most recent day first.
    pub async fn get_latest(
        limit: i64,
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        daily_summary::table
            .select(DailySummary::as_select())
            .order(daily_summary::date.desc())
            .limit(limit)
            .load(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn day_bounds_cover_exactly_one_utc_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let (start, end) = utc_day_bounds(date);

        assert_eq!(start.to_rfc3339(), "2025-03-30T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-03-31T00:00:00+00:00");
    }

    #[test]
    fn summary_copies_aggregates_and_converts_energy() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let stats = ReadingStats {
            total_readings: 2,
            avg_voltage: Some(230.0),
            avg_current: Some(4.5),
            avg_power: Some(900.0),
            max_power: Some(1000.0),
            min_power: Some(800.0),
            total_power_sum: Some(1800.0),
        };

        let summary = NewDailySummary::from_stats(date, &stats);

        assert_eq!(summary.reading_count, 2);
        assert_eq!(summary.avg_voltage, Some(230.0));
        assert_eq!(summary.max_power, Some(1000.0));
        assert!((summary.total_energy_kwh - 0.005).abs() < 1e-12);
    }
}
