//! Turn controller: run one user turn against the backend.

use crate::llm::LlmBackend;
use crate::session::ChatSession;

/// Error recorded when a turn is submitted while the backend is unreachable.
pub const BACKEND_OFFLINE_TEXT: &str = "Ollama is not running. Please start Ollama and try again.";

/// Run one turn: guard on availability, append the user message, call the
/// completion endpoint with the entire history, and append the reply (or record
/// the failure). A turn submitted while another is in flight is dropped without
/// touching the log; the entry surfaces also disable submission while loading.
pub async fn run_turn<B: LlmBackend>(session: &ChatSession, backend: &B, content: &str) {
    if !session.is_available().await {
        session.reject_turn(BACKEND_OFFLINE_TEXT).await;
        return;
    }

    let Some(history) = session.begin_turn(content).await else {
        log::debug!("turn rejected: a completion request is already in flight");
        return;
    };

    let config = session.model_config().await;
    log::info!("running turn with model {}", config.model_name);
    let result = backend.complete_chat(history, &config).await;
    if let Err(ref e) = result {
        log::warn!("completion failed: {}", e);
    }
    session.finish_turn(result).await;
}
