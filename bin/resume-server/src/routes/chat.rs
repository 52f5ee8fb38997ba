//! Streaming chat route.
//!
//! A request moves through validation, admission, prompt construction and
//! streaming, strictly in that order.  Everything up to and including the rate
//! check can still fail with an HTTP error; once [`ChatStream`] is opened the
//! response is committed to `text/event-stream` and every later failure is an
//! `error` event.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderName, header};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::post;
use futures::StreamExt;
use resume_agent::{ChatStream, ChatTurn, build_system_prompt};
use tracing::{debug, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::extract::ValidatedJson;
use crate::rate_limit::ClientKey;
use crate::schemas::chat::{ChatRequest, ChatTurnBody};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest, ChatTurnBody)))]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Stream an answer about the candidate (`POST /api/chat`).
///
/// The body is a sequence of `token` events followed by exactly one `done` or
/// `error` event.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Event stream of token / done / error events", content_type = "text/event-stream", body = String),
        (status = 400, description = "Invalid request body"),
        (status = 413, description = "Request body too large"),
        (status = 429, description = "Rate limit exceeded"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ClientKey(client): ClientKey,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let max_turns = state.config.max_history_turns;
    if req.conversation_history.len() > max_turns {
        return Err(ServerError::BadRequest(format!(
            "conversation_history has {} turns; maximum is {max_turns}",
            req.conversation_history.len(),
        )));
    }

    if !state.limiter.admit(&client) {
        warn!(%client, "rate limit exceeded");
        return Err(ServerError::RateLimited);
    }

    debug!(
        %client,
        message_len = req.message.len(),
        history_len = req.conversation_history.len(),
        "chat request admitted"
    );

    let system_prompt = build_system_prompt(&req.profile_context)?;
    let history: Vec<ChatTurn> = req.conversation_history.into_iter().map(Into::into).collect();

    let events = ChatStream::open(
        state.upstream.as_ref(),
        system_prompt,
        history,
        req.message,
        state.config.stream_timeout,
    )
    .map(|event| Event::default().event(event.kind()).json_data(&event));

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
