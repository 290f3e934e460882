use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub mod commands;
pub mod control;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/relay", post(control::handler::handler))
        .route("/relay/commands", get(commands::handler::handler))
}
