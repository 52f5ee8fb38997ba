//! `POST /api/chat` request body.

use resume_agent::{ChatRole, ChatTurn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::not_blank;

/// Upper bound for `message` and each history turn, in characters.
pub const MAX_MESSAGE_CHARS: u64 = 16 * 1024;
/// Upper bound for `profile_context`, in characters.
pub const MAX_PROFILE_CONTEXT_CHARS: u64 = 64 * 1024;

/// A single prior message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatTurnBody {
    /// `"user"` or `"assistant"`.
    #[schema(value_type = String, example = "user")]
    pub role: ChatRole,
    #[validate(length(max = MAX_MESSAGE_CHARS))]
    pub content: String,
}

impl From<ChatTurnBody> for ChatTurn {
    fn from(body: ChatTurnBody) -> Self {
        ChatTurn::new(body.role, body.content)
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatRequest {
    /// The visitor's new question.
    #[schema(example = "Is he technical enough?")]
    #[validate(custom(function = "not_blank"), length(max = MAX_MESSAGE_CHARS))]
    pub message: String,

    /// Earlier turns, oldest first.
    #[serde(default)]
    #[validate(nested)]
    pub conversation_history: Vec<ChatTurnBody>,

    /// Free-form candidate profile injected into the system prompt.
    #[serde(default)]
    #[validate(length(max = MAX_PROFILE_CONTEXT_CHARS), custom(function = "no_placeholder"))]
    pub profile_context: String,
}

fn no_placeholder(value: &str) -> Result<(), ValidationError> {
    resume_agent::prompt::validate_profile_context(value)
        .map_err(|_| ValidationError::new("placeholder"))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn parse(json: &str) -> ChatRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let req = parse(r#"{"message":"hello"}"#);
        assert!(req.conversation_history.is_empty());
        assert!(req.profile_context.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_message_fails_validation() {
        let req = parse(r#"{"message":"   "}"#);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("message"));
    }

    #[test]
    fn oversized_turn_fails_validation() {
        let req = ChatRequest {
            message: "q".into(),
            conversation_history: vec![ChatTurnBody {
                role: ChatRole::User,
                content: "x".repeat(MAX_MESSAGE_CHARS as usize + 1),
            }],
            profile_context: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn placeholder_in_profile_context_fails_validation() {
        let req = parse(r#"{"message":"q","profile_context":"x {profile_context} y"}"#);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("profile_context"));
    }

    #[test]
    fn oversized_profile_context_fails_validation() {
        let req = ChatRequest {
            message: "q".into(),
            conversation_history: vec![],
            profile_context: "p".repeat(MAX_PROFILE_CONTEXT_CHARS as usize + 1),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn history_converts_in_order() {
        let req = parse(
            r#"{"message":"q","conversation_history":[
                {"role":"user","content":"a"},
                {"role":"assistant","content":"b"}
            ]}"#,
        );
        let turns: Vec<ChatTurn> = req.conversation_history.into_iter().map(Into::into).collect();
        assert_eq!(turns, vec![ChatTurn::user("a"), ChatTurn::assistant("b")]);
    }
}
