use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::ChatError;

/// Inbound chat payload after extraction from the raw request body.
#[derive(Debug, Clone, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub message: String,
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryTurn {
    pub sender: String,
    pub text: String,
}

impl HistoryTurn {
    pub fn is_user(&self) -> bool {
        self.sender == "user"
    }
}

/// Turns are taken as sent: missing or `null` fields become empty strings,
/// other non-string values keep their JSON text, and a turn that is not an
/// object is empty.
impl From<&Value> for HistoryTurn {
    fn from(value: &Value) -> Self {
        let field = |name: &str| match value.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            sender: field("sender"),
            text: field("text"),
        }
    }
}

impl ChatRequest {
    /// Extracts `message` and `history` from a JSON body.
    ///
    /// Anything that does not yield a non-empty string `message` is an
    /// [`ChatError::InvalidMessage`]. A missing or `null` history is empty;
    /// a history that is present but not a list is
    /// [`ChatError::MalformedHistory`].
    pub fn from_body(body: &[u8]) -> Result<Self, ChatError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ChatError::InvalidMessage)?;

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .ok_or(ChatError::InvalidMessage)?
            .to_string();

        let history = match value.get("history") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(turns)) => turns.iter().map(HistoryTurn::from).collect(),
            Some(_) => return Err(ChatError::MalformedHistory),
        };

        let request = ChatRequest { message, history };
        request.validate().map_err(|_| ChatError::InvalidMessage)?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Medium,
    Complex,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Simple => "simple",
            ComplexityTier::Medium => "medium",
            ComplexityTier::Complex => "complex",
        }
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream model identifier per complexity tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub simple: String,
    pub medium: String,
    pub complex: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            simple: "meta-llama/llama-3.1-8b-instruct".to_string(),
            medium: "openai/gpt-4o-mini".to_string(),
            complex: "anthropic/claude-3.5-sonnet".to_string(),
        }
    }
}

impl ModelSelection {
    pub fn model_for(&self, tier: ComplexityTier) -> &str {
        match tier {
            ComplexityTier::Simple => &self.simple,
            ComplexityTier::Medium => &self.medium,
            ComplexityTier::Complex => &self.complex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamChatMessage {
    pub role: Role,
    pub content: String,
}

impl UpstreamChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&HistoryTurn> for UpstreamChatMessage {
    fn from(turn: &HistoryTurn) -> Self {
        let role = if turn.is_user() {
            Role::User
        } else {
            Role::Assistant
        };
        UpstreamChatMessage::new(role, turn.text.clone())
    }
}

/// Body of a chat-completions call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<UpstreamChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Subset of the chat-completions response the proxy reads.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if there is any.
    pub fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResult {
    pub reply: String,
    pub model_used: String,
    pub tier_used: ComplexityTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
    pub complexity: ComplexityTier,
}

impl From<ChatResult> for ChatResponse {
    fn from(result: ChatResult) -> Self {
        Self {
            reply: result.reply,
            model: result.model_used,
            complexity: result.tier_used,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub api_key_configured: bool,
    pub uptime_seconds: u64,
    pub version: String,
}
