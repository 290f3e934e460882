use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedQuery;

use super::models::{DailySummaryParams, DailySummaryResponse};

const HANDLER_NAME: &str = "daily_summary";

/// Get rolled-up daily totals, newest day first
#[utoipa::path(
    get,
    path = "/summary/daily",
    params(DailySummaryParams),
    responses(
        (status = 200, description = "Daily summaries", body = Vec<DailySummaryResponse>),
        (status = 400, description = "days is not an integer between 1 and 366"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "summary",
)]
#[tracing::instrument(skip_all, name = "daily_summary")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedQuery(params): ValidatedQuery<DailySummaryParams>,
) -> HandlerResult<(StatusCode, Json<Vec<DailySummaryResponse>>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let summaries = state
        .readings
        .daily_summaries(params.days())
        .await
        .map_err(|e| Error::from(e).record(&recorder))?;

    Ok((
        StatusCode::OK,
        Json(summaries.into_iter().map(Into::into).collect()),
    ))
}
