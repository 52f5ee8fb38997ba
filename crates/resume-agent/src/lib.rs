//! resume-agent – everything between a validated chat request and the model.
//!
//! - [`turn`]: conversation turns supplied by the caller.
//! - [`prompt`]: the system prompt template and its single substitution.
//! - [`upstream`]: the provider seam ([`ChatUpstream`]) and its error taxonomy.
//! - [`anthropic`]: the Anthropic Messages streaming client.
//! - [`stream`]: the adapter that turns upstream text deltas into a
//!   terminated sequence of [`SseEvent`]s.

pub mod anthropic;
pub mod prompt;
pub mod stream;
pub mod turn;
pub mod upstream;

pub use anthropic::AnthropicClient;
pub use prompt::{PromptError, build_system_prompt};
pub use stream::{ChatStream, SseEvent, SseEventKind};
pub use turn::{ChatRole, ChatTurn};
pub use upstream::{ChatUpstream, TextStream, UpstreamError, UpstreamRequest};
