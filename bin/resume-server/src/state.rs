//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use resume_agent::ChatUpstream;

use crate::config::Config;
use crate::rate_limit::RateLimiter;

/// State shared across all HTTP handlers.
///
/// Collaborators are trait objects handed in by the caller, so tests (or a
/// distributed limiter) can replace them without touching handler code.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Per-client admission gate for `/api/chat`.
    pub limiter: Arc<dyn RateLimiter>,
    /// Streaming model provider.
    pub upstream: Arc<dyn ChatUpstream>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("model", &self.upstream.model())
            .finish_non_exhaustive()
    }
}
