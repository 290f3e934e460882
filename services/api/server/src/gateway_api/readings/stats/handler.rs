use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedQuery;

use super::models::{StatsParams, StatsPeriod, StatsResponse};

const HANDLER_NAME: &str = "reading_stats";

/// Get aggregate statistics for the trailing day, week or month
///
/// `total_energy_kwh` assumes the device samples every 10 seconds.
#[utoipa::path(
    get,
    path = "/stats",
    params(StatsParams),
    responses(
        (status = 200, description = "Aggregates over the period", body = StatsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings",
)]
#[tracing::instrument(skip_all, name = "reading_stats")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedQuery(params): ValidatedQuery<StatsParams>,
) -> HandlerResult<(StatusCode, Json<StatsResponse>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let period = StatsPeriod::parse(params.period.as_deref());
    let from = Utc::now() - period.window();

    let stats = state
        .readings
        .reading_stats(from, None)
        .await
        .map_err(|e| Error::from(e).record(&recorder))?;

    Ok((StatusCode::OK, Json(StatsResponse::new(period, &stats))))
}
