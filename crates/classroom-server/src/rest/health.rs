//! `GET /health`: a single aggregate health check for external monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    active_sessions: usize,
    total_connections: usize,
    database_status: &'static str,
}

/// Reports process uptime, live occupancy, and whether the embedded store
/// still answers queries. Unhealthy iff the database check fails; nothing
/// else about this process can degrade without the process exiting.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime_seconds = state.started_at.elapsed().as_secs();
    let active_sessions = state.session_cache.len().await;
    let total_connections = state.registry.stats().await.total_connections;

    let (status_code, status, database_status) = match state.reader.list_active_sessions().await {
        Ok(_) => (StatusCode::OK, "healthy", "connected"),
        Err(err) => {
            tracing::warn!(error = %err, "health check: database query failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "unreachable")
        },
    };

    let body = HealthResponse {
        status,
        uptime_seconds,
        active_sessions,
        total_connections,
        database_status,
    };
    (status_code, Json(body))
}
