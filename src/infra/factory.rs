use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::ConnectOptions;
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{BookingRepository, HealthCheck, PropertyRepository, UserRepository};
use crate::domain::services::{auth_service::AuthService, ledger::BookingLedger};
use crate::infra::storage::local_media_store::LocalMediaStore;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_property_repo::PostgresPropertyRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_property_repo::SqlitePropertyRepo,
    sqlite_user_repo::SqliteUserRepo,
    store_health::{PostgresHealth, SqliteHealth},
};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("upload directory unavailable: {0}")]
    Storage(#[from] std::io::Error),
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    properties: Arc<dyn PropertyRepository>,
    bookings: Arc<dyn BookingRepository>,
    health: Arc<dyn HealthCheck>,
}

fn is_postgres(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

async fn connect_postgres(database_url: &str) -> Result<Repositories, BootstrapError> {
    info!("Initializing PostgreSQL connection...");

    let opts = PgConnectOptions::from_str(database_url)?
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations/postgres").run(&pool).await?;

    Ok(Repositories {
        users: Arc::new(PostgresUserRepo::new(pool.clone())),
        properties: Arc::new(PostgresPropertyRepo::new(pool.clone())),
        bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
        health: Arc::new(PostgresHealth::new(pool)),
    })
}

async fn connect_sqlite(database_url: &str) -> Result<Repositories, BootstrapError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations/sqlite").run(&pool).await?;

    Ok(Repositories {
        users: Arc::new(SqliteUserRepo::new(pool.clone())),
        properties: Arc::new(SqlitePropertyRepo::new(pool.clone())),
        bookings: Arc::new(SqliteBookingRepo::new(pool.clone())),
        health: Arc::new(SqliteHealth::new(pool)),
    })
}

/// Picks the storage backend from the URL scheme, runs migrations and wires
/// the services over the chosen repositories.
pub async fn bootstrap_state(config: &Config) -> Result<AppState, BootstrapError> {
    let repos = if is_postgres(&config.database_url) {
        connect_postgres(&config.database_url).await?
    } else {
        connect_sqlite(&config.database_url).await?
    };

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let media_store = Arc::new(LocalMediaStore::new(config.upload_dir.clone(), &config.upload_url_prefix));

    let auth_service = Arc::new(AuthService::new(repos.users.clone(), config));
    let ledger = Arc::new(BookingLedger::new(
        repos.bookings,
        repos.properties.clone(),
        repos.users,
        config.verify_booking_totals,
    ));

    Ok(AppState {
        config: config.clone(),
        property_repo: repos.properties,
        media_store,
        health: repos.health,
        auth_service,
        ledger,
        started_at: Instant::now(),
    })
}
