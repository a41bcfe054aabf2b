//! LLM backend abstraction and the Ollama client.
//!
//! Discovery (availability, model list) is polled continuously and must never
//! crash the polling loop, so those operations degrade to false/empty. The
//! completion call runs once per user turn and its failure must be visible, so
//! it is the only operation that propagates an error.

mod ollama;

use crate::chat::ModelConfig;
use async_trait::async_trait;

pub use ollama::{ChatMessage, OllamaClient};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Failed to generate response: {0}. Check if Ollama is running.")]
    Request(#[from] reqwest::Error),
    #[error("Failed to generate response: Ollama returned {0}. Check if Ollama is running.")]
    Api(String),
}

/// A chat backend: best-effort discovery plus a single-shot completion call.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// True iff the backend answers a lightweight discovery request.
    async fn check_availability(&self) -> bool;

    /// Model names in the order the backend reports them; empty on any failure.
    async fn list_models(&self) -> Vec<String>;

    /// Send the full history plus generation parameters; returns the reply text.
    async fn complete_chat(
        &self,
        history: Vec<ChatMessage>,
        config: &ModelConfig,
    ) -> Result<String, LlmError>;
}
