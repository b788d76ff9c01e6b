use std::sync::Arc;

use chatrelay_common::{Error, Result, Role};
use chatrelay_db::TranscriptStore;
use tracing::warn;

use crate::context;
use crate::router::CompletionRouter;

/// Default number of recent turns assembled into the context window.
pub const DEFAULT_WINDOW_LIMIT: usize = 6;

/// Orchestrates one chat request: validate, persist the user turn, read the
/// recent window, assemble the context, route the completion, persist the
/// assistant turn.
pub struct ChatService {
    store: Arc<dyn TranscriptStore>,
    router: CompletionRouter,
    window_limit: usize,
}

impl ChatService {
    pub fn new(store: Arc<dyn TranscriptStore>, router: CompletionRouter) -> Self {
        Self {
            store,
            router,
            window_limit: DEFAULT_WINDOW_LIMIT,
        }
    }

    pub fn with_window_limit(mut self, limit: usize) -> Self {
        self.window_limit = limit.max(1);
        self
    }

    pub fn backend_ids(&self) -> Vec<String> {
        self.router.backend_ids()
    }

    pub async fn backend_health(&self) -> Vec<(String, bool)> {
        self.router.health().await
    }

    pub async fn handle(&self, session_id: &str, prompt: &str) -> Result<String> {
        let session_id = session_id.trim();
        let prompt = prompt.trim();

        // Validation precedes any persistence or network call.
        if prompt.is_empty() {
            return Err(Error::Validation("prompt is required".to_string()));
        }
        if session_id.is_empty() {
            return Err(Error::Validation("session_id is required".to_string()));
        }

        // The user turn must be durable before any completion is attempted.
        self.store.append(session_id, Role::User, prompt)?;

        // The window read happens after the write, so it includes the turn
        // just appended.
        let window = self.store.recent_window(session_id, self.window_limit)?;
        let rendered = context::assemble(&window);

        let reply = self.router.complete(&rendered).await?;

        // The reply has already been computed; a failed assistant-turn write
        // is reported but does not invalidate the answer.
        if let Err(err) = self.store.append(session_id, Role::Assistant, &reply) {
            warn!(
                "failed to persist assistant turn for session '{}': {}",
                session_id, err
            );
        }

        Ok(reply)
    }
}
