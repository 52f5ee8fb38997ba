//! Stream adapter: upstream text deltas → server-sent events.
//!
//! [`ChatStream`] yields zero or more [`SseEvent::Token`]s followed by exactly
//! one terminal event ([`SseEvent::Done`] or [`SseEvent::Error`]) and then
//! nothing, ever.  The terminal state is a variant of the stream's internal
//! state, so the upstream is dropped the moment the terminal event is built and
//! no later poll can reach it.
//!
//! Upstream failures never escape as errors: by the time this stream is
//! polled the HTTP response head has been sent, so failures are reported as an
//! `error` event instead.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use futures::stream::FusedStream;
use serde::Serialize;
use strum::{AsRefStr, Display};
use tokio::time::{Instant, Sleep};
use tracing::{Span, error, info};

use crate::turn::ChatTurn;
use crate::upstream::{ChatUpstream, TextStream, UpstreamError, UpstreamRequest};

/// Event name written on the `event:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SseEventKind {
    Token,
    Done,
    Error,
}

/// One server-sent event.  Serializes to the JSON carried on the `data:` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SseEvent {
    Token { content: String },
    Done,
    Error { message: String },
}

impl SseEvent {
    pub fn kind(&self) -> SseEventKind {
        match self {
            SseEvent::Token { .. } => SseEventKind::Token,
            SseEvent::Done => SseEventKind::Done,
            SseEvent::Error { .. } => SseEventKind::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SseEvent::Token { .. })
    }
}

enum State {
    Streaming {
        upstream: TextStream,
        deadline: Pin<Box<Sleep>>,
    },
    Terminated,
}

enum Step {
    Token(String),
    Completed,
    Failed(UpstreamError),
}

/// Lazy, single-pass sequence of [`SseEvent`]s for one chat request.
pub struct ChatStream {
    state: State,
    span: Span,
    timeout: Duration,
    started: Instant,
    tokens: usize,
}

impl ChatStream {
    /// Open a generation for `message` following `history`.
    ///
    /// The upstream call is made lazily on first poll.  The whole stream is
    /// bounded by `timeout`; when it elapses the upstream is dropped and an
    /// `error` event ends the sequence.
    pub fn open(
        upstream: &dyn ChatUpstream,
        system_prompt: String,
        history: Vec<ChatTurn>,
        message: String,
        timeout: Duration,
    ) -> Self {
        let span = Span::current();
        span.in_scope(|| {
            info!(
                model = upstream.model(),
                prompt_length = message.len(),
                history_length = history.len(),
                "llm streaming started"
            )
        });

        let request = UpstreamRequest::new(system_prompt, history, message);
        Self {
            state: State::Streaming {
                upstream: span.in_scope(|| upstream.stream(request)),
                deadline: Box::pin(tokio::time::sleep(timeout)),
            },
            span,
            timeout,
            started: Instant::now(),
            tokens: 0,
        }
    }

    /// Number of `token` events yielded so far.
    pub fn tokens_emitted(&self) -> usize {
        self.tokens
    }

    fn complete(&mut self) -> SseEvent {
        self.state = State::Terminated;
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let tokens = self.tokens;
        self.span
            .in_scope(|| info!(tokens, elapsed_ms, "llm streaming completed"));
        SseEvent::Done
    }

    fn fail(&mut self, err: UpstreamError) -> SseEvent {
        self.state = State::Terminated;
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let tokens = self.tokens;
        self.span
            .in_scope(|| error!(error = %err, tokens, elapsed_ms, "llm streaming failed"));
        SseEvent::Error {
            message: err.client_message().to_owned(),
        }
    }
}

impl Stream for ChatStream {
    type Item = SseEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SseEvent>> {
        let this = self.get_mut();

        let step = match &mut this.state {
            State::Terminated => return Poll::Ready(None),
            State::Streaming { upstream, deadline } => {
                if deadline.as_mut().poll(cx).is_ready() {
                    Step::Failed(UpstreamError::Timeout(this.timeout))
                } else {
                    // Provider-side logs belong to the request too.
                    match this.span.in_scope(|| upstream.as_mut().poll_next(cx)) {
                        Poll::Ready(Some(Ok(text))) => Step::Token(text),
                        Poll::Ready(Some(Err(e))) => Step::Failed(e),
                        Poll::Ready(None) => Step::Completed,
                        Poll::Pending => return Poll::Pending,
                    }
                }
            }
        };

        let event = match step {
            Step::Token(content) => {
                this.tokens += 1;
                SseEvent::Token { content }
            }
            Step::Completed => this.complete(),
            Step::Failed(err) => this.fail(err),
        };
        Poll::Ready(Some(event))
    }
}

impl FusedStream for ChatStream {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Terminated)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        if let State::Streaming { .. } = self.state {
            let tokens = self.tokens;
            self.span
                .in_scope(|| info!(tokens, "client went away; upstream stream abandoned"));
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use futures::StreamExt;
    use tracing_test::traced_test;

    use super::*;

    /// Replays fixed fragments, optionally ending in a failure.
    struct Scripted {
        fragments: Vec<&'static str>,
        fail_with: Mutex<Option<UpstreamError>>,
        seen: Mutex<Option<UpstreamRequest>>,
    }

    impl Scripted {
        fn ok(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                fail_with: Mutex::new(None),
                seen: Mutex::new(None),
            }
        }

        fn failing(fragments: Vec<&'static str>, err: UpstreamError) -> Self {
            Self {
                fail_with: Mutex::new(Some(err)),
                ..Self::ok(fragments)
            }
        }
    }

    impl ChatUpstream for Scripted {
        fn model(&self) -> &str {
            "scripted"
        }

        fn stream(&self, request: UpstreamRequest) -> TextStream {
            *self.seen.lock().unwrap() = Some(request);
            let mut items: Vec<Result<String, UpstreamError>> =
                self.fragments.iter().map(|f| Ok(f.to_string())).collect();
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                items.push(Err(err));
            }
            Box::pin(futures::stream::iter(items))
        }
    }

    /// Never yields; reports when it has been dropped.
    struct Hanging {
        dropped: Mutex<Option<tokio::sync::oneshot::Sender<()>>>,
    }

    impl ChatUpstream for Hanging {
        fn model(&self) -> &str {
            "hanging"
        }

        fn stream(&self, _request: UpstreamRequest) -> TextStream {
            let guard = self.dropped.lock().unwrap().take();
            Box::pin(futures::stream::pending().map(move |item: Result<String, UpstreamError>| {
                let _keep = &guard;
                item
            }))
        }
    }

    /// Logs from inside the provider stream each time it is polled.
    struct Chatty;

    impl ChatUpstream for Chatty {
        fn model(&self) -> &str {
            "chatty"
        }

        fn stream(&self, _request: UpstreamRequest) -> TextStream {
            Box::pin(
                futures::stream::iter(vec![Ok("a".to_owned()), Ok("b".to_owned())])
                    .inspect(|_| tracing::warn!("provider delta received")),
            )
        }
    }

    fn open(upstream: &dyn ChatUpstream) -> ChatStream {
        ChatStream::open(
            upstream,
            "system".into(),
            vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")],
            "Is he technical enough?".into(),
            Duration::from_secs(30),
        )
    }

    fn provider_error() -> UpstreamError {
        UpstreamError::Provider {
            kind: "api_error".into(),
            message: "internal".into(),
        }
    }

    #[tokio::test]
    async fn n_fragments_then_done() {
        let upstream = Scripted::ok(vec!["He ", "is ", "very ", "technical."]);
        let events: Vec<SseEvent> = open(&upstream).collect().await;

        assert_eq!(events.len(), 5);
        let tokens: Vec<&str> = events[..4]
            .iter()
            .map(|e| match e {
                SseEvent::Token { content } => content.as_str(),
                other => panic!("expected token, got {other:?}"),
            })
            .collect();
        assert_eq!(tokens, vec!["He ", "is ", "very ", "technical."]);
        assert_eq!(events[4], SseEvent::Done);
        assert!(!events.iter().any(|e| e.kind() == SseEventKind::Error));
    }

    #[tokio::test]
    async fn zero_fragments_is_just_done() {
        let upstream = Scripted::ok(vec![]);
        let events: Vec<SseEvent> = open(&upstream).collect().await;
        assert_eq!(events, vec![SseEvent::Done]);
    }

    #[tokio::test]
    async fn k_fragments_then_error_without_done() {
        let upstream = Scripted::failing(vec!["partial ", "answer"], provider_error());
        let events: Vec<SseEvent> = open(&upstream).collect().await;

        assert_eq!(events.len(), 3);
        assert!(events[..2].iter().all(|e| e.kind() == SseEventKind::Token));
        assert_eq!(events[2].kind(), SseEventKind::Error);
        assert!(!events.contains(&SseEvent::Done));
    }

    #[tokio::test]
    async fn connect_failure_is_a_single_error_event() {
        let upstream = Scripted::failing(vec![], UpstreamError::Incomplete);
        let events: Vec<SseEvent> = open(&upstream).collect().await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
        assert_eq!(events[0].kind(), SseEventKind::Error);
    }

    #[tokio::test]
    async fn nothing_follows_the_terminal_event() {
        let upstream = Scripted::ok(vec!["a"]);
        let mut stream = open(&upstream);

        assert_eq!(stream.next().await.map(|e| e.kind()), Some(SseEventKind::Token));
        assert_eq!(stream.next().await, Some(SseEvent::Done));
        assert!(stream.is_terminated());
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.tokens_emitted(), 1);
    }

    #[tokio::test]
    async fn message_is_appended_after_history() {
        let upstream = Scripted::ok(vec![]);
        let _ = open(&upstream).collect::<Vec<_>>().await;

        let seen = upstream.seen.lock().unwrap().take().unwrap();
        assert_eq!(seen.system, "system");
        assert_eq!(seen.messages.len(), 3);
        assert_eq!(seen.messages[2], ChatTurn::user("Is he technical enough?"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_upstream_times_out_with_error_event() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let upstream = Hanging {
            dropped: Mutex::new(Some(tx)),
        };
        let mut stream = open(&upstream);

        let event = stream.next().await.unwrap();
        assert_eq!(
            event,
            SseEvent::Error {
                message: "The response took too long and was stopped.".into()
            }
        );
        // Upstream released as soon as the terminal event was produced.
        assert!(rx.await.is_err());
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn dropping_the_stream_releases_the_upstream() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let upstream = Hanging {
            dropped: Mutex::new(Some(tx)),
        };
        let stream = open(&upstream);
        drop(stream);
        assert!(rx.await.is_err());
    }

    #[test]
    fn event_payloads_match_wire_format() {
        let token = SseEvent::Token {
            content: "hi".into(),
        };
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            serde_json::json!({ "type": "token", "content": "hi" })
        );
        assert_eq!(
            serde_json::to_value(SseEvent::Done).unwrap(),
            serde_json::json!({ "type": "done" })
        );
        assert_eq!(SseEventKind::Error.as_ref(), "error");
    }

    #[tokio::test]
    #[traced_test]
    async fn failures_are_logged_with_detail() {
        let upstream = Scripted::failing(vec![], provider_error());
        let _ = open(&upstream).collect::<Vec<_>>().await;
        assert!(logs_contain("llm streaming started"));
        assert!(logs_contain("llm streaming failed"));
        assert!(logs_contain("api_error"));
    }

    #[tokio::test]
    #[traced_test]
    async fn provider_logs_carry_the_request_span() {
        let span = tracing::info_span!("http_request", request_id = "rid-77");
        let stream = span.in_scope(|| open(&Chatty));
        drop(span);

        // Polled outside the span, the way the response body is.
        let events: Vec<SseEvent> = stream.collect().await;
        assert_eq!(events.len(), 3);

        logs_assert(|lines: &[&str]| {
            let provider: Vec<&&str> = lines
                .iter()
                .filter(|l| l.contains("provider delta received"))
                .collect();
            if provider.len() != 2 {
                return Err(format!("expected 2 provider lines, got {}", provider.len()));
            }
            if provider.iter().all(|l| l.contains("rid-77")) {
                Ok(())
            } else {
                Err(format!("provider line outside request span: {provider:?}"))
            }
        });
    }
}
