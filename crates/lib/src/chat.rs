//! Chat data model: messages, conversation state, model settings, and the
//! backend availability snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Temperature range accepted by the settings surface.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 1.0);

/// Max-token range accepted by the settings surface.
pub const MAX_TOKENS_RANGE: (u32, u32) = (256, 4096);

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in the conversation log. Immutable once created; messages are
/// only ever appended, and removed only by clearing the whole log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The conversation log plus turn bookkeeping. `is_loading` is true only while
/// exactly one completion request is outstanding; `error` is cleared whenever a
/// new turn begins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Generation settings. Mutated only by explicit settings changes (and the
/// poller's one-time default model fill); lives for the session, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelConfig {
    /// Clamp settings into their accepted ranges and trim the model name.
    pub fn sanitized(mut self) -> Self {
        self.model_name = self.model_name.trim().to_string();
        self.temperature = self
            .temperature
            .clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
        self.max_tokens = self.max_tokens.clamp(MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1);
        self
    }
}

/// What the poller last saw: backend reachability and the model catalogue.
/// Replaced wholesale every poll cycle, never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySnapshot {
    pub is_available: bool,
    pub known_models: Vec<String>,
}
