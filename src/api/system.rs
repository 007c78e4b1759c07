//! Liveness and readiness probes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

/// `GET /api/health/live`
///
/// Process-is-up probe; touches no dependencies.
pub async fn health_live() -> impl IntoResponse {
    Json(LivenessResponse { status: "alive" })
}

/// `GET /api/health/ready`
///
/// Ready only when the database answers a round-trip query.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store.ping().await.is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = Json(ReadinessResponse {
        ready: database,
        checks: ReadinessChecks { database },
    });

    (status, body).into_response()
}
