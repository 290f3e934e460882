use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::gateway_api::gateway_error::GatewayError;
use crate::gateway_api::readings::models::ReadingResponse;
use crate::shared::extractors::request_id::RequestId;

const HANDLER_NAME: &str = "latest_reading";

/// Get the most recent reading
#[utoipa::path(
    get,
    path = "/latest",
    responses(
        (status = 200, description = "Most recent reading", body = ReadingResponse),
        (status = 404, description = "No readings stored yet"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings",
)]
#[tracing::instrument(skip_all, name = "latest_reading")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> HandlerResult<(StatusCode, Json<ReadingResponse>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let latest = state
        .readings
        .latest_reading()
        .await
        .map_err(|e| Error::from(e).record(&recorder))?;

    match latest {
        Some(reading) => Ok((StatusCode::OK, Json(reading.into()))),
        None => Err(GatewayError::no_data(
            "No readings available".to_string(),
            request_id.to_string(),
        )),
    }
}
