pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use crate::config::Config;
use crate::infra::factory::bootstrap_state;
use api::router::create_router;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", "find-my-pg.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,find_my_pg=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized. Writing JSON logs to ./logs/");
    guard
}

/// Loads configuration, bootstraps storage and serves the API until the
/// process is stopped. Start-up failures are logged and returned.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let _guard = init_logging();

    let config = Config::from_env().inspect_err(|e| error!("Invalid configuration: {}", e))?;
    let state = bootstrap_state(&config).await.inspect_err(|e| error!("Start-up failed: {}", e))?;
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!("Server running on port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
