//! Provider seam.
//!
//! [`ChatUpstream`] is the only thing the stream adapter knows about the model
//! provider.  Implementations translate their transport and protocol failures
//! into [`UpstreamError`] so nothing provider-specific crosses this boundary.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use thiserror::Error;

use crate::turn::ChatTurn;

/// Incremental text fragments in arrival order.
///
/// The stream ends after the provider signals end-of-message, or right after
/// yielding the first `Err`.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// One streaming generation request: system prompt plus ordered turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub system: String,
    pub messages: Vec<ChatTurn>,
}

impl UpstreamRequest {
    /// Append `message` as the final user turn after `history`.
    pub fn new(system: impl Into<String>, history: Vec<ChatTurn>, message: impl Into<String>) -> Self {
        let mut messages = history;
        messages.push(ChatTurn::user(message));
        Self {
            system: system.into(),
            messages,
        }
    }
}

/// A streaming chat-completion provider.
pub trait ChatUpstream: Send + Sync + 'static {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Start one streaming generation.
    ///
    /// Nothing happens until the returned stream is polled; dropping it
    /// abandons the provider call.
    fn stream(&self, request: UpstreamRequest) -> TextStream;
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to reach model provider: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("model provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model provider reported {kind}: {message}")]
    Provider { kind: String, message: String },

    #[error("stream interrupted: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed stream event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("stream closed before end of message")]
    Incomplete,

    #[error("stream exceeded {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    /// Terse text safe to show to end users.
    pub fn client_message(&self) -> &'static str {
        match self {
            UpstreamError::Connect(_) => "The assistant is unavailable right now. Please try again.",
            UpstreamError::Status { status: 429 | 529, .. } => {
                "The assistant is busy right now. Please try again shortly."
            }
            UpstreamError::Provider { kind, .. } if kind == "overloaded_error" => {
                "The assistant is busy right now. Please try again shortly."
            }
            UpstreamError::Timeout(_) => "The response took too long and was stopped.",
            _ => "The assistant ran into a problem generating a response.",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
