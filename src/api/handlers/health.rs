use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::error;
use crate::api::dtos::responses::HealthResponse;
use crate::state::AppState;

fn report(database_ok: bool, uptime_secs: u64) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
    };
    (code, Json(HealthResponse { status, database, uptime_secs }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.health.ping().await {
        Ok(()) => true,
        Err(e) => {
            error!("Health check could not reach the database: {}", e);
            false
        }
    };
    report(database_ok, state.started_at.elapsed().as_secs())
}
