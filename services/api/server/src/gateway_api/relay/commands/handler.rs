use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;

use super::models::RelayCommandsResponse;

/// Current relay commands, polled by the device
#[utoipa::path(
    get,
    path = "/relay/commands",
    responses(
        (status = 200, description = "Desired relay states", body = RelayCommandsResponse),
    ),
    tag = "relay",
)]
#[tracing::instrument(skip_all, name = "relay_commands")]
pub async fn handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<RelayCommandsResponse>) {
    (
        StatusCode::OK,
        Json(state.relay_commands.snapshot().into()),
    )
}
