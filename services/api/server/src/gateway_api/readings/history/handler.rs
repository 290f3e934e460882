use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::gateway_api::readings::models::ReadingResponse;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedQuery;

use super::models::HistoryParams;

const HANDLER_NAME: &str = "reading_history";

/// Get readings from the trailing window, oldest first
///
/// The list is not paginated.
#[utoipa::path(
    get,
    path = "/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "Readings in the window", body = Vec<ReadingResponse>),
        (status = 400, description = "hours is not an integer or out of range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings",
)]
#[tracing::instrument(skip_all, name = "reading_history")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedQuery(params): ValidatedQuery<HistoryParams>,
) -> HandlerResult<(StatusCode, Json<Vec<ReadingResponse>>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let Some(from) = params.window_start(Utc::now()) else {
        return Ok((StatusCode::OK, Json(Vec::new())));
    };

    let readings = state
        .readings
        .readings_since(from)
        .await
        .map_err(|e| Error::from(e).record(&recorder))?;

    tracing::debug!(
        hours = params.hours(),
        count = readings.len(),
        "History loaded"
    );

    Ok((
        StatusCode::OK,
        Json(readings.into_iter().map(ReadingResponse::from).collect()),
    ))
}
