//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (request id, request logging, CORS, body limit)
//! - Optional Swagger UI and OpenAPI document (disable with `RESUME_ENABLE_SWAGGER=false`)
//! - Root info and health routes
//! - `/api` chat and contact routes
//! - The built frontend as fallback, when `RESUME_STATIC_DIR` exists

mod chat;
mod contact;
pub mod doc;
mod health;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tracing::info;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(chat::router())
        .merge(contact::router());

    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    let static_dir = Path::new(&state.config.static_dir);
    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "serving static frontend");
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app.layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(trace::trace_middleware))
                .layer(cors::cors_layer(&state.config)),
        )
        .with_state(state)
}

// ── Test support ──────────────────────────────────────────────────────────────


// ── Tests ──────────────────────────────────────────────────────────────────────
