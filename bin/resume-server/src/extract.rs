//! JSON body extractor that validates before the handler runs.

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;
use validator::{Validate, ValidationErrors};

use crate::error::ServerError;

/// Like [`axum::Json`], but runs `validator` rules and reports every failure
/// (syntax, shape, rules) as [`ServerError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(from_rejection)?;
        value
            .validate()
            .map_err(|e| ServerError::BadRequest(describe(&e)))?;
        Ok(Self(value))
    }
}

/// Serde detail can quote the offending value, so it goes to the log only.
fn from_rejection(rejection: JsonRejection) -> ServerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServerError::PayloadTooLarge;
    }
    warn!(detail = %rejection.body_text(), "json body rejected");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ServerError::BadRequest("expected Content-Type: application/json".into())
        }
        _ => ServerError::BadRequest("invalid JSON body".into()),
    }
}

/// Field names only; offending values stay out of the response.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<&str> = errors.errors().keys().map(|k| k.as_ref()).collect();
    fields.sort_unstable();
    format!("invalid field(s): {}", fields.join(", "))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
