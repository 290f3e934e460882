// The OpenApi derive macro generates code using Iterator::for_each,
// which is disallowed by our clippy config. Allow it at module level.
#![allow(clippy::disallowed_methods)]

use utoipa::OpenApi;

/// OpenAPI documentation for the endpoints nested under `/api`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::gateway_api::readings::ingest::handler::handler,
        crate::gateway_api::readings::latest::handler::handler,
        crate::gateway_api::readings::history::handler::handler,
        crate::gateway_api::readings::stats::handler::handler,
        crate::gateway_api::relay::control::handler::handler,
        crate::gateway_api::relay::commands::handler::handler,
        crate::gateway_api::summary::daily::handler::handler,
    ),
    info(
        title = "Energy Meter Gateway API",
        version = "1.0.0",
        description = "Ingests meter readings, serves readings and aggregates, and relays relay commands to the device",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "/api", description = "Gateway API")
    ),
    tags(
        (name = "readings", description = "Reading ingestion, history and statistics"),
        (name = "relay", description = "Relay commands polled by the device"),
        (name = "summary", description = "Rolled-up daily totals")
    )
)]
pub struct GatewayApiDoc;

impl GatewayApiDoc {
    pub fn openapi() -> utoipa::openapi::OpenApi {
        <GatewayApiDoc as utoipa::OpenApi>::openapi()
    }
}
