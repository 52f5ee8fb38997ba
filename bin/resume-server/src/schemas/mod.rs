//! Request / response bodies for the public HTTP API.
//!
//! Structural checks (required fields, sizes, email syntax) live on the types
//! as `validator` rules and run in [`crate::extract::ValidatedJson`] before any
//! handler code.

pub mod chat;
pub mod contact;

use validator::ValidationError;

/// Reject empty or whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
