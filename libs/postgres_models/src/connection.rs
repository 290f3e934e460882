use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_postgres::Client as TokioPgClient;
use tracing::Instrument;
use tracing::{info, instrument, warn};

pub type Pool = bb8::Pool<AsyncPgConnection>;
pub type PooledConnection = bb8::PooledConnection<'static, AsyncPgConnection>;

pub const MAX_POOL_SIZE: u32 = 300;
pub const MIN_RESERVED_CONNECTIONS: u32 = 10;

/// Where and as whom to connect.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl ConnectionSettings {
    /// libpq key/value connection string. Values are quoted so passwords
    /// containing spaces, `#` or quotes survive intact.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            quote_value(&self.host),
            self.port,
            quote_value(&self.user),
            quote_value(&self.password),
            quote_value(&self.dbname),
        )
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .finish()
    }
}

fn quote_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

pub async fn create_tokio_pg_client(
    db_url: &str,
) -> Result<TokioPgClient, tokio_postgres::Error> {
    let (client, connection) =
        tokio_postgres::connect(db_url, tokio_postgres::NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

pub async fn get_max_connections(
    client: &TokioPgClient,
) -> Result<i32, anyhow::Error> {
    let row = client
        .query_one("SELECT current_setting('max_connections')", &[])
        .await?;

    let max_conn_str: String = row.get(0);
    let max_conn: i32 = max_conn_str.parse().map_err(|e| {
        anyhow::anyhow!(
            "Failed to parse max_connections '{}': {}",
            max_conn_str,
            e
        )
    })?;

    Ok(max_conn)
}

fn calculate_optimal_pool_size(
    db_max_connections: i32,
    num_app_instances: u32,
    reserved_for_admin: u32,
) -> u32 {
    let available =
        db_max_connections.saturating_sub(reserved_for_admin as i32);

    let per_instance =
        (available.max(0) as f32 / num_app_instances.max(1) as f32).floor()
            as u32;

    per_instance.clamp(1, MAX_POOL_SIZE)
}

/// Build the bounded pool. The size follows the server's `max_connections`
/// and is capped by `max_pool_size` when one is configured.
pub async fn establish_connection(
    settings: &ConnectionSettings,
    max_pool_size: Option<u32>,
) -> Result<Pool, anyhow::Error> {
    let db_url = settings.connection_string();
    let client = create_tokio_pg_client(&db_url).await.map_err(|e| {
        anyhow::anyhow!("Failed to create PostgreSQL tokio client: {}", e)
    })?;

    let max_conn = get_max_connections(&client).await?;
    info!("PostgreSQL max_connections: {}", max_conn);

    let optimal =
        calculate_optimal_pool_size(max_conn, 1, MIN_RESERVED_CONNECTIONS);
    let pool_size = max_pool_size.map_or(optimal, |cap| cap.clamp(1, optimal));
    info!("PostgreSQL max_pool_size: {}", pool_size);

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool = bb8::Pool::builder()
        .max_size(pool_size)
        .connection_timeout(Duration::from_secs(10))
        .idle_timeout(Some(Duration::from_secs(180)))
        .retry_connection(true)
        .max_lifetime(Some(Duration::from_secs(3600)))
        .build(config)
        .await?;

    let mut conn = pool.get_owned().await?;
    diesel::sql_query("SELECT 1").execute(&mut conn).await?;

    Ok(pool)
}

#[instrument(skip(pool))]
pub async fn shutdown_pool_with_timeout(
    pool: Arc<Pool>,
    shutdown_timeout: Duration,
) -> Result<(), String> {
    info!("Starting graceful PostgreSQL pool shutdown with timeout");

    let state = pool.state();
    info!(
        "Current pool state - total: {}, idle: {}, active: {}",
        state.connections,
        state.idle_connections,
        state.connections - state.idle_connections
    );

    if state.connections > state.idle_connections {
        let active_count = state.connections - state.idle_connections;
        warn!(
            "Waiting for {} active database connections to finish",
            active_count
        );

        let start = tokio::time::Instant::now();
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;

            let current_state = pool.state();
            let active =
                current_state.connections - current_state.idle_connections;

            if active == 0 {
                info!("All database connections are now idle");
                break;
            }

            if start.elapsed() > shutdown_timeout {
                warn!(
                    "Shutdown timeout reached with {} active connections remaining",
                    active
                );
                break;
            }
        }
    }

    drop(pool);

    info!("PostgreSQL pool shutdown complete");
    Ok(())
}

/// Apply pending embedded migrations. The schema files only use
/// `CREATE TABLE IF NOT EXISTS`, so this is safe against databases that were
/// provisioned by hand.
pub async fn run_migrations<A>(
    async_connection: A,
    migrations: EmbeddedMigrations,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    A: AsyncConnection<Backend = Pg> + 'static,
{
    let mut async_wrapper: AsyncConnectionWrapper<A> =
        AsyncConnectionWrapper::from(async_connection);

    if tokio::runtime::Handle::try_current().is_err() {
        return Err(
            "This function must be called from within a Tokio runtime".into()
        );
    }

    task::spawn_blocking(move || {
        async_wrapper
            .run_pending_migrations(migrations)
            .map(|applied| applied.len())
    })
    .await?
    .map(|applied| info!(applied, "Database migrations applied"))
}

/// Execute a database operation with a scoped connection.
///
/// The connection is taken from the pool when the operation starts and goes
/// back when the returned future completes, on success and on error alike.
///
/// ```rust,ignore
/// let latest = with_connection(&pool, |mut conn| async move {
///     Reading::latest(&mut conn).await
/// })
/// .await?;
/// ```
///
/// Acquisition and use are recorded as the `acquiring_pooled_connection` and
/// `holding_db_connection` spans.
pub async fn with_connection<F, Fut, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: FnOnce(PooledConnection) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let pool_state_before = pool.state();
    let acquire_span = tracing::info_span!(
        "acquiring_pooled_connection",
        pool.connections = pool_state_before.connections,
        pool.idle_connections = pool_state_before.idle_connections,
    );

    let conn =
        async { pool.get_owned().await.map_err(WithConnectionError::Pool) }
            .instrument(acquire_span)
            .await?;

    let hold_span = tracing::info_span!("holding_db_connection");
    let result = async {
        operation(conn)
            .await
            .map_err(WithConnectionError::Operation)
    }
    .instrument(hold_span)
    .await;

    let pool_state_after = pool.state();
    tracing::debug!(
        pool.connections = pool_state_after.connections,
        pool.idle_connections = pool_state_after.idle_connections,
        "connection_returned_to_pool"
    );

    result
}

/// Error type for with_connection that distinguishes between pool and operation errors
#[derive(Debug)]
pub enum WithConnectionError<E> {
    /// Error acquiring connection from the pool
    Pool(diesel_async::pooled_connection::bb8::RunError),
    /// Error from the database operation itself
    Operation(E),
}

impl<E: std::fmt::Display> std::fmt::Display for WithConnectionError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithConnectionError::Pool(e) => {
                write!(f, "Failed to acquire connection: {}", e)
            }
            WithConnectionError::Operation(e) => {
                write!(f, "Database operation failed: {}", e)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error
    for WithConnectionError<E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WithConnectionError::Pool(e) => Some(e),
            WithConnectionError::Operation(e) => Some(e),
        }
    }
}

/// Execute database operations within an atomic transaction.
///
/// Commits when `operation` succeeds and rolls back otherwise. Pool errors and
/// operation errors stay distinguishable through [`WithConnectionError`].
pub async fn with_transaction<F, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: for<'c> FnOnce(
            &'c mut AsyncPgConnection,
        ) -> futures::future::BoxFuture<'c, Result<T, E>>
        + Send,
    T: Send,
    E: From<diesel::result::Error> + std::error::Error + Send,
{
    with_connection(pool, |mut conn| async move {
        let txn_span = tracing::info_span!("database_transaction");

        async {
            let result = conn
                .transaction::<T, E, _>(|txn_conn| {
                    Box::pin(operation(txn_conn))
                })
                .await;

            match &result {
                Ok(_) => tracing::debug!("transaction_committed"),
                Err(e) => {
                    tracing::error!(error = %e, "transaction_rolled_back")
                }
            }

            result
        }
        .instrument(txn_span)
        .await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(password: &str) -> ConnectionSettings {
        ConnectionSettings {
            host: "db.local".to_string(),
            port: 5433,
            user: "meter".to_string(),
            password: password.to_string(),
            dbname: "energy_meter".to_string(),
        }
    }

    #[test]
    fn connection_string_quotes_every_value() {
        assert_eq!(
            settings("Govind#15").connection_string(),
            "host='db.local' port=5433 user='meter' password='Govind#15' dbname='energy_meter'"
        );
    }

    #[test]
    fn connection_string_escapes_quotes_and_backslashes() {
        assert_eq!(
            settings(r"it's\here").connection_string(),
            r"host='db.local' port=5433 user='meter' password='it\'s\\here' dbname='energy_meter'"
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", settings("hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn pool_size_leaves_room_for_admin_connections() {
        assert_eq!(calculate_optimal_pool_size(100, 1, 10), 90);
        assert_eq!(calculate_optimal_pool_size(100, 3, 10), 30);
    }

    #[test]
    fn pool_size_is_bounded() {
        assert_eq!(calculate_optimal_pool_size(10_000, 1, 10), MAX_POOL_SIZE);
        assert_eq!(calculate_optimal_pool_size(5, 1, 10), 1);
    }
}
