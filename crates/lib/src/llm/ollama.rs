//! Ollama API client (http://127.0.0.1:11434 by default).
//!
//! Completion replies are requested non-streamed but normalized defensively:
//! some backends ignore `stream: false` and return newline-delimited JSON
//! fragments in one payload. Normalization always yields display text; a chat
//! surface must have something to show, so unrecognized bodies collapse to a
//! sentinel message rather than an error.

use super::{LlmBackend, LlmError};
use crate::chat::ModelConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Shown when a fragment stream ends without a final `done: true`.
pub const INCOMPLETE_RESPONSE_TEXT: &str = "Could not process the complete response.";

/// Shown when the reply body matches none of the known shapes.
pub const UNEXPECTED_FORMAT_TEXT: &str = "Received response in an unexpected format.";

/// Client for the Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

/// One `{role, content}` pair as sent to /api/chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    options: GenerationOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerationOptions {
    temperature: f32,
    num_predict: u32,
}

/// One reply document: either a chat-style object, a legacy completion object,
/// or a single NDJSON fragment. All fields optional so any of the three parses.
#[derive(Debug, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    message: Option<ReplyMessage>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Option<Vec<TagModel>>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /api/tags — shared by availability checks and model listing.
    async fn fetch_tags(&self) -> Result<TagsResponse, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(LlmError::Api(res.status().to_string()));
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    async fn check_availability(&self) -> bool {
        match self.fetch_tags().await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("ollama availability check failed: {}", e);
                false
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_tags().await {
            Ok(tags) => tags
                .models
                .unwrap_or_default()
                .into_iter()
                .map(|m| m.name)
                .collect(),
            Err(e) => {
                log::debug!("ollama model listing failed: {}", e);
                Vec::new()
            }
        }
    }

    /// POST /api/chat — non-streaming chat completion over the full history.
    async fn complete_chat(
        &self,
        history: Vec<ChatMessage>,
        config: &ModelConfig,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: config.model_name.clone(),
            messages: history,
            options: GenerationOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
            stream: false,
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let detail = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, detail.trim())));
        }
        let text = res.text().await?;
        Ok(normalize_chat_body(&text))
    }
}

/// The shapes a 2xx completion body can take, tried in a fixed order.
#[derive(Debug)]
enum ReplyShape {
    /// Single object with a nested assistant message.
    Message(String),
    /// Single object with a top-level `response` field (legacy completion shape).
    Completion(String),
    /// Newline-delimited fragments; `done` is whether the last line confirmed
    /// completion.
    Fragments { fragments: Vec<ChatPayload>, done: bool },
    Unrecognized,
}

fn classify_reply(body: &str) -> ReplyShape {
    let trimmed = body.trim();

    // A whole-body parse only succeeds for a single JSON document, so a
    // concatenated NDJSON payload falls through to the fragment pass.
    if let Ok(payload) = serde_json::from_str::<ChatPayload>(trimmed) {
        if let Some(message) = payload.message {
            return ReplyShape::Message(message.content);
        }
        if let Some(response) = payload.response {
            return ReplyShape::Completion(response);
        }
        return ReplyShape::Unrecognized;
    }

    let lines: Vec<&str> = trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let mut fragments = Vec::new();
    for line in &lines {
        match serde_json::from_str::<ChatPayload>(line) {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => log::debug!("skipping unparseable fragment line: {}", e),
        }
    }
    if fragments.is_empty() {
        return ReplyShape::Unrecognized;
    }
    // The completion flag is only trusted on the literal last line; a payload
    // whose tail was lost is reported as incomplete, not as partial text.
    let done = lines
        .last()
        .and_then(|l| serde_json::from_str::<ChatPayload>(l).ok())
        .map(|p| p.done)
        .unwrap_or(false);
    ReplyShape::Fragments { fragments, done }
}

/// Normalize a completion body into display text. Never fails.
fn normalize_chat_body(body: &str) -> String {
    match classify_reply(body) {
        ReplyShape::Message(content) => content,
        ReplyShape::Completion(response) => response,
        ReplyShape::Fragments { fragments, done } => {
            if !done {
                return INCOMPLETE_RESPONSE_TEXT.to_string();
            }
            fragments
                .iter()
                .filter_map(|f| f.message.as_ref())
                .map(|m| m.content.as_str())
                .collect()
        }
        ReplyShape::Unrecognized => {
            log::warn!("unexpected completion response format");
            UNEXPECTED_FORMAT_TEXT.to_string()
        }
    }
}
