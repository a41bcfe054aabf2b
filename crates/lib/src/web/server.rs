//! HTTP server wiring: router, handlers, poller lifecycle, graceful shutdown.

use crate::chat::{Conversation, ModelConfig};
use crate::config::{self, Config};
use crate::llm::OllamaClient;
use crate::poller::Poller;
use crate::session::ChatSession;
use crate::turn;
use crate::web::protocol::{SendParams, StatusView};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/ui/index.html"));

/// Shared state for the web server.
#[derive(Clone)]
struct AppState {
    session: Arc<ChatSession>,
    backend: OllamaClient,
    port: u16,
}

/// Run the web server; binds to config.server.bind:config.server.port and owns
/// the availability poller for the lifetime of the process. Blocks until
/// shutdown (e.g. Ctrl+C), then stops the poller.
pub async fn run_server(config: Config) -> Result<()> {
    let backend = OllamaClient::new(config::resolve_ollama_base_url(&config));
    log::info!("using ollama backend at {}", backend.base_url());

    let session = Arc::new(ChatSession::new(ModelConfig {
        model_name: config::resolve_default_model(&config).unwrap_or_default(),
        temperature: config.chat.temperature,
        max_tokens: config.chat.max_tokens,
    }));
    let poller = Poller::start(
        session.clone(),
        backend.clone(),
        Duration::from_secs(config.chat.poll_interval_secs.max(1)),
    );

    let state = AppState {
        session,
        backend,
        port: config.server.port,
    };
    let app = Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/status", get(get_status))
        .route("/api/messages", post(send_message))
        .route("/api/config", put(update_config))
        .route("/api/clear", post(clear_chat))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("local chatbot listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server exited")?;

    poller.stop();
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / — the embedded browser chat page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/health returns a simple health JSON (for probes).
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}

/// GET /api/state — conversation snapshot.
async fn get_state(State(state): State<AppState>) -> Json<Conversation> {
    Json(state.session.conversation().await)
}

/// GET /api/status — availability snapshot plus current model settings.
async fn get_status(State(state): State<AppState>) -> Json<StatusView> {
    let snapshot = state.session.availability().await;
    Json(StatusView {
        is_available: snapshot.is_available,
        known_models: snapshot.known_models,
        config: state.session.model_config().await,
    })
}

/// POST /api/messages — run one turn and return the updated conversation.
/// Blank content is refused at the entry surface before any state changes.
async fn send_message(
    State(state): State<AppState>,
    Json(params): Json<SendParams>,
) -> Result<Json<Conversation>, StatusCode> {
    let content = params.content.trim();
    if content.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    turn::run_turn(state.session.as_ref(), &state.backend, content).await;
    Ok(Json(state.session.conversation().await))
}

/// PUT /api/config — fully replace the model settings.
async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<ModelConfig>,
) -> Json<ModelConfig> {
    Json(state.session.update_config(config).await)
}

/// POST /api/clear — reset the conversation.
async fn clear_chat(State(state): State<AppState>) -> Json<Conversation> {
    state.session.clear().await;
    Json(state.session.conversation().await)
}
