use anyhow::Context;
use energy_gateway::metrics::ServerMetrics;
use energy_gateway::rollup::DailySummaryRollup;
use energy_gateway::shutdown::listen_for_shutdown_signals;
use energy_gateway::storage::{PgReadingStore, ReadingStore};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics::Telemetry;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./../../../db/migrations");

fn main() {
    let config = match energy_gateway::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // Keeps the client alive for the lifetime of the process
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = setup(config).await {
            tracing::error!("Fatal error during setup: {e:#}");
            std::process::exit(1);
        }
    });
}

fn init_tracing(log_format: &str) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing filter")?;

    if log_format != "pretty" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .json();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .pretty();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    };

    Ok(())
}

async fn setup(config: energy_gateway::Config) -> anyhow::Result<()> {
    init_tracing(&config.log_format)?;

    let addr = config.listen_addr();
    tracing::info!(
        version = energy_gateway::VERSION.unwrap_or("unknown"),
        "Starting energy-gateway service at: {addr}"
    );

    let db_settings = config.database_settings();
    tracing::info!(?db_settings, "Connecting to Postgres");

    let db_pool = postgres_models::connection::establish_connection(
        &db_settings,
        config.database_max_connections,
    )
    .await
    .context("Failed to connect to Postgres")?;

    let db_pool_conn = db_pool
        .get_owned()
        .await
        .context("Failed to get connection from pool for migrations")?;

    postgres_models::connection::run_migrations(db_pool_conn, MIGRATIONS)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to run database migrations")?;

    let store: Arc<dyn ReadingStore> = Arc::new(PgReadingStore::new(db_pool));

    // Initialize prom telemetry
    let metrics =
        ServerMetrics::new(None).context("Failed to create server metrics")?;
    let telemetry = Telemetry::new(Some(metrics));
    tracing::info!("Initialized telemetry");

    let rollup_interval =
        Duration::from_secs(config.daily_rollup_interval_secs.max(1));
    let app_state =
        energy_gateway::AppState::new(store.clone(), config, telemetry);
    let shutdown = app_state.shutdown.clone();

    tokio::spawn(
        DailySummaryRollup::new(store, rollup_interval).run(shutdown.clone()),
    );

    // Spawn shutdown signal handler
    let shutdown_handle = shutdown.clone();
    tokio::spawn(async move {
        listen_for_shutdown_signals().await;
        shutdown_handle.shutdown().await;
    });

    let app = energy_gateway::app(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_for_serve.wait_for_shutdown().await
        })
        .await
        .context("Server exited with error")?;

    Ok(())
}
