//! Availability poller: periodic backend discovery feeding the session.
//!
//! An explicit cancellable task owned by whoever runs the session (the web
//! server or the CLI loop), not a free-running global timer. The first cycle
//! runs immediately at startup so the UI gets a status without waiting out the
//! first interval.

use crate::chat::AvailabilitySnapshot;
use crate::llm::LlmBackend;
use crate::session::ChatSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to the polling task; abort it via [`Poller::stop`] at teardown.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling loop. Each cycle checks availability, refreshes the
    /// model list when the backend answers, default-fills the model selection,
    /// and replaces the session's availability snapshot wholesale. Discovery
    /// failures degrade to an unavailable snapshot and never end the loop.
    pub fn start<B: LlmBackend + 'static>(
        session: Arc<ChatSession>,
        backend: B,
        every: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut was_available = false;
            loop {
                ticker.tick().await;
                let is_available = backend.check_availability().await;
                if is_available != was_available {
                    if is_available {
                        log::info!("ollama backend is reachable");
                    } else {
                        log::warn!("ollama backend is unreachable");
                    }
                    was_available = is_available;
                }
                let known_models = if is_available {
                    backend.list_models().await
                } else {
                    Vec::new()
                };
                if !known_models.is_empty() {
                    session.default_fill_model(&known_models).await;
                }
                session
                    .replace_availability(AvailabilitySnapshot {
                        is_available,
                        known_models,
                    })
                    .await;
            }
        });
        Self { handle }
    }

    /// Cancel the polling task.
    pub fn stop(self) {
        self.handle.abort();
    }
}
