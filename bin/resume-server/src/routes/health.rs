//! Root info, liveness and readiness endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_root, get_health, get_ready))]
pub struct HealthApi;

/// Register info and health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/health/ready", get(get_ready))
}

/// Service banner with a pointer to the API docs.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service info", body = Value))
)]
pub async fn get_root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "docs":    "/swagger-ui",
    }))
}

/// Liveness probe.
///
/// Returns `{"status": "healthy", ...}` with HTTP 200.  Touches no state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is alive", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status":  "healthy",
        "service": "ai-resume-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Server is ready to accept traffic", body = Value)
    )
)]
pub async fn get_ready(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status":      "ready",
        "environment": state.config.environment,
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
