use axum::Router;

use crate::AppState;

pub(crate) mod error_recorder;
pub(crate) mod errors;
pub(crate) mod gateway_error;
pub(crate) mod readings;
pub(crate) mod relay;
pub(crate) mod summary;

pub fn get_routes(state: AppState) -> Router {
    Router::new()
        .merge(readings::get_routes())
        .merge(relay::get_routes())
        .merge(summary::get_routes())
        .with_state(state)
}
