use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Timestamptz};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::schema::readings;

/// Fixed sampling period the metering device reports at.
///
/// Energy is approximated as the sum of power samples times this interval,
/// so gaps or bursts in reporting skew the result.
pub const ASSUMED_SAMPLE_INTERVAL_SECS: f64 = 10.0;
pub const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Converts a sum of `total_power` samples (W) into kWh.
pub fn approximate_energy_kwh(total_power_sum_w: f64) -> f64 {
    total_power_sum_w * ASSUMED_SAMPLE_INTERVAL_SECS / WATT_SECONDS_PER_KWH
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, serde::Serialize)]
#[diesel(table_name = readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reading {
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

/// A reading as submitted by the device. The timestamp is assigned by the
/// database on insert.
#[derive(Insertable, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = readings)]
pub struct NewReading {
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

#[derive(QueryableByName, Debug, Clone, Default, PartialEq)]
pub struct ReadingStats {
    #[diesel(sql_type = BigInt)]
    pub total_readings: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_voltage: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_current: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_power: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub max_power: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub min_power: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_power_sum: Option<f64>,
}

impl ReadingStats {
    /// Energy over the window, 0 when nothing was recorded.
    pub fn total_energy_kwh(&self) -> f64 {
        self.total_power_sum
            .map(approximate_energy_kwh)
            .unwrap_or(0.0)
    }
}

impl Reading {
    pub async fn insert(
        reading: &NewReading,
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        diesel::insert_into(readings::table)
            .values(reading)
            .execute(conn)
            .await
    }

    /// Most recent reading; equal timestamps resolve to the highest id.
    pub async fn latest(
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        readings::table
            .select(Reading::as_select())
            .order((readings::timestamp.desc(), readings::id.desc()))
            .first(conn)
            .await
            .optional()
    }

    /// All readings at or after `from`, oldest first.
    pub async fn since(
        from: DateTime<Utc>,
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        readings::table
            .filter(readings::timestamp.ge(from))
            .select(Reading::as_select())
            .order((readings::timestamp.asc(), readings::id.asc()))
            .load(conn)
            .await
    }

    /// Aggregate statistics for readings in `[from, to)`, or `[from, ..)` when
    /// `to` is absent.
    pub async fn stats(
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
        conn: &mut AsyncPgConnection,
    ) -> Result<ReadingStats, diesel::result::Error> {
        let mut query = String::from(
            "SELECT COUNT(*) AS total_readings, \
             AVG(voltage) AS avg_voltage, \
             AVG(total_current) AS avg_current, \
             AVG(total_power) AS avg_power, \
             MAX(total_power) AS max_power, \
             MIN(total_power) AS min_power, \
             SUM(total_power) AS total_power_sum \
             FROM readings WHERE \"timestamp\" >= $1",
        );

        match to {
            Some(to) => {
                query.push_str(" AND \"timestamp\" < $2");
                diesel::sql_query(&query)
                    .bind::<Timestamptz, _>(from)
                    .bind::<Timestamptz, _>(to)
                    .get_result::<ReadingStats>(conn)
                    .await
            }
            None => {
                diesel::sql_query(&query)
                    .bind::<Timestamptz, _>(from)
                    .get_result::<ReadingStats>(conn)
                    .await
            }
        }
    }
}
