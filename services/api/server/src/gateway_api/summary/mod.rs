use axum::Router;
use axum::routing::get;

use crate::AppState;

pub mod daily;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/summary/daily", get(daily::handler::handler))
}
