use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::shared::extractors::payload::Payload;
use crate::shared::extractors::request_id::RequestId;

use super::models::{IngestResponse, ReadingPayload};

const HANDLER_NAME: &str = "ingest_reading";

/// Store a reading submitted by the metering device
///
/// The timestamp is assigned by the server on insert.
#[utoipa::path(
    post,
    path = "/data",
    request_body = ReadingPayload,
    responses(
        (status = 200, description = "Reading stored", body = IngestResponse),
        (status = 400, description = "Body is not a JSON object"),
        (status = 500, description = "Database unavailable or insert failed"),
    ),
    tag = "readings",
)]
#[tracing::instrument(skip_all, name = "ingest_reading")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Payload(object): Payload<Map<String, Value>>,
) -> HandlerResult<(StatusCode, Json<IngestResponse>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let payload = ReadingPayload::try_from(object).map_err(|e| {
        Error::Validation {
            field: "body",
            message: format!("Invalid reading: {e}"),
        }
        .record(&recorder)
    })?;

    state
        .readings
        .insert_reading(payload.into())
        .await
        .map_err(|e| Error::from(e).record(&recorder))?;

    state.telemetry.maybe_use_metrics(|m| m.record_reading_ingested());
    tracing::debug!("Reading stored");

    Ok((StatusCode::OK, Json(IngestResponse::saved())))
}
