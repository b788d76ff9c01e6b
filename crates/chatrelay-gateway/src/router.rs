use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use chatrelay_common::Error;

use crate::state::SharedState;

/// Build the application router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn home() -> axum::Json<Value> {
    axum::Json(json!({
        "status": "chatrelay backend is live with a two-tier completion chain"
    }))
}

async fn status(State(state): State<SharedState>) -> axum::Json<Value> {
    let backends: serde_json::Map<String, Value> = state
        .service
        .backend_health()
        .await
        .into_iter()
        .map(|(id, healthy)| (id, json!({ "healthy": healthy })))
        .collect();

    axum::Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "backends": backends,
    }))
}

#[derive(serde::Deserialize)]
struct ChatRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// POST /chat: run one prompt through the completion pipeline.
async fn chat(
    State(state): State<SharedState>,
    axum::Json(body): axum::Json<ChatRequest>,
) -> (StatusCode, axum::Json<Value>) {
    let prompt = body.prompt.unwrap_or_default();
    let session_id = body.session_id.unwrap_or_default();

    match state.service.handle(&session_id, &prompt).await {
        Ok(reply) => (StatusCode::OK, axum::Json(json!({ "response": reply }))),
        Err(err) => error_response(err),
    }
}

fn error_response(err: Error) -> (StatusCode, axum::Json<Value>) {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::BackendsExhausted(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": err.to_string() })))
}
