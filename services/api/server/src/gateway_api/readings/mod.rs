use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub mod history;
pub mod ingest;
pub mod latest;
pub mod models;
pub mod stats;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/data", post(ingest::handler::handler))
        .route("/latest", get(latest::handler::handler))
        .route("/history", get(history::handler::handler))
        .route("/stats", get(stats::handler::handler))
}
