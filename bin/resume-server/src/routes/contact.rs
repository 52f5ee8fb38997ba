//! Contact form route.  Submissions are logged; nothing is delivered.

use std::sync::Arc;

use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::extract::ValidatedJson;
use crate::schemas::contact::{ContactRequest, ContactResponse};
use crate::state::AppState;

const PREVIEW_CHARS: usize = 100;

#[derive(OpenApi)]
#[openapi(paths(submit_contact), components(schemas(ContactRequest, ContactResponse)))]
pub struct ContactApi;

/// Register contact routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/contact", post(submit_contact))
}

/// Accept a contact form submission (`POST /api/contact`).
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission recorded", body = ContactResponse),
        (status = 400, description = "Invalid submission"),
    )
)]
pub async fn submit_contact(
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> Json<ContactResponse> {
    let message_preview: String = req.message.chars().take(PREVIEW_CHARS).collect();
    info!(
        name = %req.name,
        email = %req.email,
        company = %req.company,
        role = %req.role,
        %message_preview,
        "contact form submitted"
    );

    Json(ContactResponse {
        success: true,
        message: "Thank you! We'll be in touch soon.".into(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
