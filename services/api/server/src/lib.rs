//! # Energy Gateway
//!
//! HTTP gateway between an energy-metering device and PostgreSQL. The device
//! posts readings and polls relay commands; the dashboard reads readings,
//! statistics and daily summaries and issues relay commands.
use crate::gateway_api::gateway_error::GatewayError;
use crate::metrics::ServerMetrics;
use crate::relay_commands::RelayCommandStore;
use crate::shared::extractors::request_id::RequestId;
use crate::shutdown::ShutdownCoordinator;
use crate::storage::ReadingStore;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use std::sync::Arc;
use telemetry::metrics::Telemetry;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer,
    cors::CorsLayer, trace::TraceLayer,
};

// Private API modules - internal implementation details
mod gateway_api;

// OpenAPI documentation module
pub mod openapi;

// Public modules - shared utilities, storage and background jobs
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod relay_commands;
pub mod rollup;
pub mod shared;
pub mod shutdown;
pub mod storage;

pub use gateway_api::get_routes as get_gateway_api_routes;

pub const VERSION: Option<&'static str> = option_env!("VERSION");

/// Returns the OpenAPI documentation routes: Swagger UI and the JSON document
/// it renders.
pub fn get_openapi_routes() -> Router {
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url(
        "/api-docs/openapi.json",
        openapi::GatewayApiDoc::openapi(),
    ))
}

/// The complete HTTP surface of the gateway.
pub fn app(state: AppState) -> Router {
    Router::new()
        .without_v07_checks()
        .route("/", get(dashboard::handler))
        .route("/health", get(health::handler))
        .route("/version", get(|| async { VERSION.unwrap_or("unknown") }))
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone())
        .nest("/api", get_gateway_api_routes(state))
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
        .merge(get_openapi_routes())
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.telemetry.get_metrics(),
    )
}

async fn fallback_handler(
    RequestId(request_id): RequestId,
) -> impl IntoResponse {
    GatewayError::not_found(
        "The requested endpoint does not exist".to_string(),
        Vec::new(),
        request_id.to_string(),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry<ServerMetrics>>,
    pub readings: Arc<dyn ReadingStore>,
    pub relay_commands: RelayCommandStore,
    pub config: Arc<Config>,
    pub shutdown: Arc<ShutdownCoordinator>,
}

impl AppState {
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        config: Config,
        telemetry: Arc<Telemetry<ServerMetrics>>,
    ) -> Self {
        Self {
            telemetry,
            shutdown: Arc::new(ShutdownCoordinator::new(readings.clone())),
            readings,
            relay_commands: RelayCommandStore::new(),
            config: Arc::new(config),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct Config {
    // Service address
    #[serde(default = "default_api_service_host")]
    pub api_service_host: String,
    #[serde(default = "default_api_service_port")]
    pub api_service_port: u16,

    // Loggers
    #[serde(default)]
    pub log_format: String,
    pub sentry_dsn: Option<String>,

    // Db configs
    #[serde(default = "default_database_host")]
    pub database_host: String,
    #[serde(default = "default_database_port")]
    pub database_port: u16,
    #[serde(default = "default_database_user")]
    pub database_user: String,
    pub database_password: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    pub database_max_connections: Option<u32>,

    // Device protocol
    #[serde(default = "default_relay_poll_interval_secs")]
    pub relay_poll_interval_secs: u64,
    #[serde(default = "default_daily_rollup_interval_secs")]
    pub daily_rollup_interval_secs: u64,
}

fn default_api_service_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_service_port() -> u16 {
    5000
}

fn default_database_host() -> String {
    "localhost".to_string()
}

fn default_database_port() -> u16 {
    5432
}

fn default_database_user() -> String {
    "postgres".to_string()
}

fn default_database_name() -> String {
    "energy_meter".to_string()
}

fn default_relay_poll_interval_secs() -> u64 {
    3
}

fn default_daily_rollup_interval_secs() -> u64 {
    900
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        // Load .env file if present (useful when running outside docker-compose)
        match dotenv::dotenv() {
            Ok(path) => eprintln!("Loaded .env from: {}", path.display()),
            Err(e) => eprintln!("dotenv warning: {e}"),
        }

        envy::from_env::<Config>()
    }

    pub fn database_settings(
        &self,
    ) -> postgres_models::connection::ConnectionSettings {
        postgres_models::connection::ConnectionSettings {
            host: self.database_host.clone(),
            port: self.database_port,
            user: self.database_user.clone(),
            password: self.database_password.clone(),
            dbname: self.database_name.clone(),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api_service_host, self.api_service_port)
    }
}
