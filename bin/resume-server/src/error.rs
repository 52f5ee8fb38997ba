//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON body
//! `{"error": "..."}` with an appropriate status code.
//!
//! Only errors raised before a response is committed pass through here.  Once
//! a chat stream has started, failures travel as `error` events instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use resume_agent::PromptError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// All errors that can occur before a response is sent.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed, incomplete or out-of-bounds request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The client exceeded its admission quota.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The request body exceeded the configured size cap.
    #[error("payload too large")]
    PayloadTooLarge,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => {
                warn!(reason = %m, "request rejected");
                (StatusCode::BAD_REQUEST, m.clone())
            }
            ServerError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded".to_owned(),
            ),
            ServerError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_owned(),
            ),
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<PromptError> for ServerError {
    fn from(e: PromptError) -> Self {
        ServerError::BadRequest(e.to_string())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
