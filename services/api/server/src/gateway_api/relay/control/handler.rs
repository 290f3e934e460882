use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::gateway_api::error_recorder::ErrorRecorder;
use crate::gateway_api::errors::{Error, HandlerResult};
use crate::relay_commands::Relay;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::models::{RelayCommandRequest, RelayControlResponse};

const HANDLER_NAME: &str = "relay_control";

/// Set the desired state of a relay
///
/// The device applies it on its next poll of `/relay/commands`. Later
/// commands overwrite earlier ones.
#[utoipa::path(
    post,
    path = "/relay",
    request_body = RelayCommandRequest,
    responses(
        (status = 200, description = "Command stored", body = RelayControlResponse),
        (status = 400, description = "Unknown relay or non-boolean state"),
    ),
    tag = "relay",
)]
#[tracing::instrument(skip_all, name = "relay_control")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(request): ValidatedPayload<RelayCommandRequest>,
) -> HandlerResult<(StatusCode, Json<RelayControlResponse>)> {
    let recorder =
        ErrorRecorder::new(&state.telemetry, HANDLER_NAME, &request_id);

    let relay = Relay::try_from(request.relay).map_err(|relay| {
        Error::Validation {
            field: "relay",
            message: format!("relay must be 1 or 2, got {relay}"),
        }
        .record(&recorder)
    })?;

    state.relay_commands.set(relay, request.state);
    state.telemetry.maybe_use_metrics(|m| {
        m.record_relay_command(relay.number(), request.state)
    });
    tracing::info!(
        relay = relay.number(),
        state = request.state,
        "Relay command stored"
    );

    Ok((
        StatusCode::OK,
        Json(RelayControlResponse::stored(
            relay.number(),
            request.state,
            state.config.relay_poll_interval_secs,
        )),
    ))
}
