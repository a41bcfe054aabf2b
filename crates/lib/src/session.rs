//! Conversation session: message log, model settings, and backend availability.
//!
//! All mutation goes through named transitions so the invariants hold: at most
//! one completion request in flight, error cleared when a turn begins, and the
//! availability snapshot replaced wholesale each poll cycle. The presentation
//! layer only ever reads clones of the state.

use crate::chat::{AvailabilitySnapshot, Conversation, Message, ModelConfig};
use crate::llm::{ChatMessage, LlmError};
use tokio::sync::RwLock;

/// One chat session. Process-local; created at startup, discarded at exit.
pub struct ChatSession {
    conversation: RwLock<Conversation>,
    config: RwLock<ModelConfig>,
    availability: RwLock<AvailabilitySnapshot>,
}

impl ChatSession {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            conversation: RwLock::new(Conversation::default()),
            config: RwLock::new(config.sanitized()),
            availability: RwLock::new(AvailabilitySnapshot::default()),
        }
    }

    /// Snapshot of the conversation for rendering.
    pub async fn conversation(&self) -> Conversation {
        self.conversation.read().await.clone()
    }

    pub async fn model_config(&self) -> ModelConfig {
        self.config.read().await.clone()
    }

    pub async fn availability(&self) -> AvailabilitySnapshot {
        self.availability.read().await.clone()
    }

    pub async fn is_available(&self) -> bool {
        self.availability.read().await.is_available
    }

    /// Replace the availability snapshot wholesale (poller only).
    pub async fn replace_availability(&self, snapshot: AvailabilitySnapshot) {
        *self.availability.write().await = snapshot;
    }

    /// Select the first known model when no model is configured yet. The sole
    /// case of the poller touching the model settings.
    pub async fn default_fill_model(&self, models: &[String]) {
        let Some(first) = models.first() else {
            return;
        };
        let mut config = self.config.write().await;
        if config.model_name.is_empty() {
            log::info!("no model configured, defaulting to {}", first);
            config.model_name = first.clone();
        }
    }

    /// Replace the model settings (settings-change callback).
    pub async fn update_config(&self, config: ModelConfig) -> ModelConfig {
        let config = config.sanitized();
        *self.config.write().await = config.clone();
        config
    }

    /// Record a precondition failure without touching the message log.
    pub async fn reject_turn(&self, reason: impl Into<String>) {
        self.conversation.write().await.error = Some(reason.into());
    }

    /// Start a turn: append the user message, mark loading, clear any previous
    /// error, and return the full history projected to wire messages. Returns
    /// `None` without changing anything while another turn is in flight.
    pub async fn begin_turn(&self, content: impl Into<String>) -> Option<Vec<ChatMessage>> {
        let mut conversation = self.conversation.write().await;
        if conversation.is_loading {
            return None;
        }
        conversation.messages.push(Message::user(content));
        conversation.is_loading = true;
        conversation.error = None;
        Some(
            conversation
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        )
    }

    /// Finish a turn: append the assistant reply or record the failure text.
    pub async fn finish_turn(&self, result: Result<String, LlmError>) {
        let mut conversation = self.conversation.write().await;
        conversation.is_loading = false;
        match result {
            Ok(reply) => conversation.messages.push(Message::assistant(reply)),
            Err(e) => conversation.error = Some(e.to_string()),
        }
    }

    /// Reset to an empty conversation under one write lock, so no observer can
    /// see a partially cleared state.
    pub async fn clear(&self) {
        *self.conversation.write().await = Conversation::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    fn session() -> ChatSession {
        ChatSession::new(ModelConfig {
            model_name: "llama3.2:1b".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        })
    }

    #[tokio::test]
    async fn begin_turn_appends_user_message_and_sets_loading() {
        let session = session();
        let history = session.begin_turn("Hi").await.expect("turn accepted");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "Hi");

        let conversation = session.conversation().await;
        assert!(conversation.is_loading);
        assert_eq!(conversation.error, None);
        assert_eq!(conversation.messages.len(), 1);
    }

    #[tokio::test]
    async fn begin_turn_rejected_while_loading_changes_nothing() {
        let session = session();
        session.begin_turn("first").await.unwrap();
        assert!(session.begin_turn("second").await.is_none());
        let conversation = session.conversation().await;
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].content, "first");
    }

    #[tokio::test]
    async fn begin_turn_clears_previous_error() {
        let session = session();
        session.reject_turn("backend offline").await;
        assert!(session.conversation().await.error.is_some());
        session.begin_turn("Hi").await.unwrap();
        assert_eq!(session.conversation().await.error, None);
    }

    #[tokio::test]
    async fn finish_turn_success_appends_assistant_reply() {
        let session = session();
        session.begin_turn("Hi").await.unwrap();
        session.finish_turn(Ok("Hello!".to_string())).await;
        let conversation = session.conversation().await;
        assert!(!conversation.is_loading);
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].role, Role::Assistant);
        assert_eq!(conversation.messages[1].content, "Hello!");
    }

    #[tokio::test]
    async fn finish_turn_failure_records_error_and_no_reply() {
        let session = session();
        session.begin_turn("Hi").await.unwrap();
        session
            .finish_turn(Err(LlmError::Api("500 Internal Server Error".to_string())))
            .await;
        let conversation = session.conversation().await;
        assert!(!conversation.is_loading);
        assert_eq!(conversation.messages.len(), 1);
        let error = conversation.error.expect("error recorded");
        assert!(error.contains("Check if Ollama is running"));
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let session = session();
        session.begin_turn("Hi").await.unwrap();
        session
            .finish_turn(Err(LlmError::Api("boom".to_string())))
            .await;
        session.clear().await;
        let conversation = session.conversation().await;
        assert!(conversation.messages.is_empty());
        assert!(!conversation.is_loading);
        assert_eq!(conversation.error, None);
    }

    #[tokio::test]
    async fn default_fill_only_applies_to_empty_model_name() {
        let session = ChatSession::new(ModelConfig {
            model_name: String::new(),
            temperature: 0.7,
            max_tokens: 2048,
        });
        session.default_fill_model(&[]).await;
        assert_eq!(session.model_config().await.model_name, "");

        session
            .default_fill_model(&["qwen3:8b".to_string(), "llama3.2:1b".to_string()])
            .await;
        assert_eq!(session.model_config().await.model_name, "qwen3:8b");

        session.default_fill_model(&["other".to_string()]).await;
        assert_eq!(session.model_config().await.model_name, "qwen3:8b");
    }

    #[tokio::test]
    async fn update_config_sanitizes_before_storing() {
        let session = session();
        let stored = session
            .update_config(ModelConfig {
                model_name: " qwen3:8b ".to_string(),
                temperature: 9.0,
                max_tokens: 10,
            })
            .await;
        assert_eq!(stored.model_name, "qwen3:8b");
        assert_eq!(stored.temperature, 1.0);
        assert_eq!(stored.max_tokens, 256);
        assert_eq!(session.model_config().await.max_tokens, 256);
    }

    #[tokio::test]
    async fn replace_availability_is_wholesale() {
        let session = session();
        session
            .replace_availability(AvailabilitySnapshot {
                is_available: true,
                known_models: vec!["a".to_string(), "b".to_string()],
            })
            .await;
        session
            .replace_availability(AvailabilitySnapshot {
                is_available: false,
                known_models: Vec::new(),
            })
            .await;
        let snapshot = session.availability().await;
        assert!(!snapshot.is_available);
        assert!(snapshot.known_models.is_empty());
    }
}
