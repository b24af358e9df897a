use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::configuration::StorageSettings;

/// Startup connection attempts before giving up
pub const CONNECT_ATTEMPTS: u32 = 3;
/// Bound on a single attempt, and the pause between attempts
pub const CONNECT_BACKOFF: Duration = Duration::from_secs(5);
/// Per-request deadline; pool acquisition never waits longer than this
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_CONNECTIONS: u32 = 5;

/// Connect to Postgres, retrying a few times while the database comes up
pub async fn connect_with_retries(settings: &StorageSettings) -> Result<PgPool, sqlx::Error> {
    let connection_string = settings.connection_string();
    let mut attempt = 1;

    loop {
        let connect = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(REQUEST_TIMEOUT)
            .connect(&connection_string);

        let error = match tokio::time::timeout(CONNECT_BACKOFF, connect).await {
            Ok(Ok(pool)) => return Ok(pool),
            Ok(Err(e)) => e,
            Err(_) => sqlx::Error::PoolTimedOut,
        };

        if attempt >= CONNECT_ATTEMPTS {
            return Err(error);
        }
        tracing::warn!(
            attempt = attempt,
            host = %settings.host,
            database = %settings.database,
            error = %error,
            "Database connection failed, retrying"
        );
        attempt += 1;
        tokio::time::sleep(CONNECT_BACKOFF).await;
    }
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
