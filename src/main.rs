use std::sync::Arc;

use storefront::auth::{PasswordHasher, TokenHelper};
use storefront::cache::MemoryCache;
use storefront::configuration::get_configuration;
use storefront::db;
use storefront::startup::{run, AppListener, AppState};
use storefront::storage::{PgCategoryRepository, PgProductRepository, PgUserRepository};
use storefront::telemetry::init_telemetry;

fn fatal(kind: std::io::ErrorKind, message: &'static str) -> std::io::Error {
    std::io::Error::new(kind, message)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = match get_configuration() {
        Ok(config) => {
            init_telemetry(config.log_level());
            tracing::info!(debug = config.is_debug, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            init_telemetry("info");
            tracing::error!("Failed to read configuration: {}", e);
            return Err(fatal(std::io::ErrorKind::InvalidInput, "Configuration error"));
        }
    };

    let cache = Arc::new(MemoryCache::new(configuration.refresh_cache.capacity_bytes));
    let tokens = TokenHelper::new(&configuration.jwt, cache).map_err(|e| {
        tracing::error!("Invalid JWT settings: {}", e);
        fatal(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    tracing::info!("Attempting to connect to database");
    let pool = db::connect_with_retries(&configuration.storage)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            fatal(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;
    db::migrate(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        fatal(std::io::ErrorKind::Other, "Database migration error")
    })?;
    tracing::info!("Database connection pool created successfully");

    let state = AppState {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        products: Arc::new(PgProductRepository::new(pool.clone())),
        categories: Arc::new(PgCategoryRepository::new(pool)),
        hasher: PasswordHasher::new(configuration.password.cost),
        tokens: Arc::new(tokens),
    };

    let listener = AppListener::bind(&configuration.listen)?;
    let server = run(listener, state)?;
    tracing::info!("Server started successfully");

    server.await
}
