use std::sync::Arc;

use chatrelay_chat::ChatService;

/// Shared state handed to every gateway handler. Holds no per-request or
/// cross-request conversation state; everything conversational lives in the
/// transcript store.
pub struct AppState {
    pub service: ChatService,
}

pub type SharedState = Arc<AppState>;
