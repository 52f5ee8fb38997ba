//! Anthropic Messages API streaming client.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::turn::ChatTurn;
use crate::upstream::{ChatUpstream, TextStream, UpstreamError, UpstreamRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const API_VERSION: &str = "2023-06-01";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Streaming client for `POST /v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(UpstreamError::Client)?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: BlockDelta },
    MessageStop,
    Error { error: ErrorPayload },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Splits a byte stream into SSE frames and joins each frame's `data:` lines.
#[derive(Debug, Default)]
struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    fn next_frame(&mut self) -> Option<String> {
        let end = self.buf.windows(2).position(|w| w == b"\n\n")?;
        let frame: Vec<u8> = self.buf.drain(..end + 2).collect();
        let text = String::from_utf8_lossy(&frame[..end]);
        let data = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|value| value.strip_prefix(' ').unwrap_or(value))
            .collect::<Vec<_>>()
            .join("\n");
        Some(data)
    }
}

impl ChatUpstream for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn stream(&self, request: UpstreamRequest) -> TextStream {
        let http = self.http.clone();
        let url = format!("{}/v1/messages", self.base_url);
        let api_key = self.api_key.clone();
        let model = self.model.clone();
        let max_tokens = self.max_tokens;

        Box::pin(async_stream::stream! {
            let body = MessagesRequest {
                model: &model,
                max_tokens,
                system: &request.system,
                messages: &request.messages,
                stream: true,
            };

            let response = match http
                .post(&url)
                .header("x-api-key", &api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield Err(UpstreamError::Connect(e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "model provider rejected request");
                yield Err(UpstreamError::Status { status: status.as_u16(), body });
                return;
            }
            debug!(%model, turns = request.messages.len(), "upstream stream opened");

            let mut bytes = response.bytes_stream();
            let mut decoder = FrameDecoder::default();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(UpstreamError::Transport(e));
                        return;
                    }
                };
                decoder.push(&chunk);

                while let Some(data) = decoder.next_frame() {
                    if data.is_empty() {
                        continue;
                    }
                    let event = match serde_json::from_str::<StreamEvent>(&data) {
                        Ok(event) => event,
                        Err(e) => {
                            yield Err(UpstreamError::Decode(e));
                            return;
                        }
                    };
                    match event {
                        StreamEvent::ContentBlockDelta { delta: BlockDelta::TextDelta { text } } => {
                            yield Ok(text);
                        }
                        StreamEvent::MessageStop => return,
                        StreamEvent::Error { error } => {
                            yield Err(UpstreamError::Provider { kind: error.kind, message: error.message });
                            return;
                        }
                        StreamEvent::ContentBlockDelta { .. } | StreamEvent::Other => {}
                    }
                }
            }

            yield Err(UpstreamError::Incomplete);
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
