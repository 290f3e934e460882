mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use common::{build_test_app, reading};
use energy_gateway::rollup::DailySummaryRollup;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[tokio::test]
async fn rollup_summarises_yesterday_and_today() {
    let app = build_test_app();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

    app.store.seed(now - TimeDelta::days(3), reading(5000.0));
    app.store.seed(Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(), reading(1000.0));
    app.store.seed(Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap(), reading(2000.0));
    app.store.seed(Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(), reading(600.0));

    let rollup = DailySummaryRollup::new(app.store.clone(), Duration::from_secs(60));
    let written = rollup.run_once(now).await.unwrap();
    assert_eq!(written.len(), 2);

    let response = app.server.get("/api/summary/daily").await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();

    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["date"], "2025-06-02");
    assert_eq!(body[0]["reading_count"], 1);
    assert_eq!(body[1]["date"], "2025-06-01");
    assert_eq!(body[1]["reading_count"], 2);
    assert_eq!(body[1]["max_power"], 2000.0);
    assert_eq!(body[1]["min_power"], 1000.0);

    let kwh = body[1]["total_energy_kwh"].as_f64().unwrap();
    assert!((kwh - 3000.0 * 10.0 / 3_600_000.0).abs() < 1e-9);
}

#[tokio::test]
async fn rollup_replaces_the_summary_of_a_day() {
    let app = build_test_app();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
    let rollup = DailySummaryRollup::new(app.store.clone(), Duration::from_secs(60));

    app.store.seed(now - TimeDelta::hours(1), reading(100.0));
    rollup.run_once(now).await.unwrap();

    app.store.seed(now - TimeDelta::minutes(1), reading(300.0));
    rollup.run_once(now).await.unwrap();

    let summaries = app.store.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    assert_eq!(summaries[0].reading_count, 2);
    assert_eq!(summaries[0].max_power, Some(300.0));
}

#[tokio::test]
async fn days_limits_the_result() {
    let app = build_test_app();
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
    app.store.seed(now - TimeDelta::days(1), reading(100.0));
    app.store.seed(now, reading(100.0));
    DailySummaryRollup::new(app.store.clone(), Duration::from_secs(60))
        .run_once(now)
        .await
        .unwrap();

    let body: Vec<Value> = app
        .server
        .get("/api/summary/daily")
        .add_query_param("days", 1)
        .await
        .json();

    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["date"], "2025-06-02");
}

#[tokio::test]
async fn empty_summary_table_is_an_empty_list() {
    let app = build_test_app();

    let response = app.server.get("/api/summary/daily").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn days_outside_the_range_are_rejected() {
    let app = build_test_app();

    for days in ["0", "367", "-1", "week"] {
        let response = app
            .server
            .get("/api/summary/daily")
            .add_query_param("days", days)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
