//! `POST /api/contact` request / response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// Request body for a contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ContactRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,

    #[schema(example = "recruiter@example.com")]
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub company: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub role: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub message: String,
}

/// Response body for a contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
