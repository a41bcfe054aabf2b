//! Wire types for the browser-facing JSON API.

use crate::chat::ModelConfig;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    pub content: String,
}

/// Payload of `GET /api/status`: backend availability plus the current model
/// settings, read-only for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub is_available: bool,
    pub known_models: Vec<String>,
    pub config: ModelConfig,
}
