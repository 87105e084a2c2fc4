//! Health check endpoints.
//!
//! These endpoints are used by load balancers and orchestration systems
//! to determine if the service is healthy and ready to receive traffic.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Service name.
    pub service: String,

    /// Service version.
    pub version: String,

    /// Current timestamp (ISO 8601).
    pub timestamp: String,

    /// In-memory schedule summary (readyz only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleHealth>,
}

/// What the store currently holds.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ScheduleHealth {
    pub tasks: usize,
    pub days: usize,
    pub strategy: String,
}

/// Create health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
}

fn response(schedule: Option<ScheduleHealth>) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        service: "scheduler".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        schedule,
    }
}

/// Basic health check - is the service running?
async fn healthz() -> impl IntoResponse {
    Json(response(None))
}

/// Readiness check.
///
/// The schedule lives in memory, so the service is ready as soon as it can
/// take the store's read lock.
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.store().stats().await;
    Json(response(Some(ScheduleHealth {
        tasks: stats.tasks,
        days: stats.days,
        strategy: state.strategy().to_string(),
    })))
}

/// Liveness check.
async fn livez() -> impl IntoResponse {
    StatusCode::OK
}
