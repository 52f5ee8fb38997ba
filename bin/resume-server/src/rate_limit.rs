//! Per-client sliding-window admission control for `/api/chat`.
//!
//! [`RateLimiter`] is the seam handlers depend on; [`SlidingWindowLimiter`]
//! is the in-process implementation.  State is single-node and best-effort:
//! nothing survives a restart and nothing is shared between instances.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use tracing::debug;

use crate::state::AppState;

/// Key shared by every client whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Admission gate keyed by client identity.
pub trait RateLimiter: Send + Sync + 'static {
    /// Record an admission for `client_key` and return `true`, or return
    /// `false` without recording anything when the client is over its limit.
    fn admit(&self, client_key: &str) -> bool;
}

/// Admits at most `limit` requests per key within any trailing `window`.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    /// `client_key` → admission instants, oldest first.
    buckets: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(WindowState {
                buckets: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// [`RateLimiter::admit`] evaluated at an explicit instant.
    pub fn admit_at(&self, client_key: &str, now: Instant) -> bool {
        // A poisoned lock only means another request panicked mid-check; the
        // timestamps themselves are still usable.
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let window = self.window;

        if now.saturating_duration_since(state.last_sweep) >= window {
            let before = state.buckets.len();
            state.buckets.retain(|_, hits| {
                hits.back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < window)
            });
            state.last_sweep = now;
            debug!(evicted = before - state.buckets.len(), "rate limiter swept idle clients");
        }

        let hits = state.buckets.entry(client_key.to_owned()).or_default();
        while let Some(oldest) = hits.front() {
            if now.saturating_duration_since(*oldest) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.limit {
            return false;
        }
        hits.push_back(now);
        true
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn admit(&self, client_key: &str) -> bool {
        self.admit_at(client_key, Instant::now())
    }
}

// ── Client identity ───────────────────────────────────────────────────────────

/// Rate-limit key for the calling client.
///
/// The peer IP address by default; the first `X-Forwarded-For` hop when
/// `trust_forwarded_for` is configured; [`UNKNOWN_CLIENT`] otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<Arc<AppState>> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(client_key(parts, state.config.trust_forwarded_for)))
    }
}

fn client_key(parts: &Parts, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_owned();
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
