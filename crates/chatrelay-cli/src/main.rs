use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatrelay_chat::{
    ChatService, CompletionRouter, GeminiBackend, GenerationParams, HuggingFaceBackend,
    TextBackend,
};
use chatrelay_config::{AppConfig, ConfigLoader};
use chatrelay_db::SqliteTranscriptStore;
use chatrelay_gateway::{AppState, build_router};

#[derive(Debug, Parser)]
#[command(name = "chatrelay", version, about = "Two-tier conversational completion proxy")]
struct Cli {
    /// Path to a TOML config file (defaults to ./chatrelay.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the gateway bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the gateway bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let store = SqliteTranscriptStore::open(&config.database.path)
        .context("failed to open transcript store")?;

    let router = build_completion_router(&config)?;
    let service = ChatService::new(Arc::new(store), router)
        .with_window_limit(config.chat.window_limit);

    let state = Arc::new(AppState { service });

    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .context("invalid gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("chatrelay gateway listening on {addr}");
    axum::serve(listener, build_router(state))
        .await
        .context("gateway server exited")?;

    Ok(())
}

/// Assemble the ordered backend chain: Gemini first, Hugging Face as the
/// fallback tier. API keys come from config when present, otherwise from
/// the environment.
fn build_completion_router(config: &AppConfig) -> anyhow::Result<CompletionRouter> {
    let primary = match config.primary.api_key.clone() {
        Some(key) => GeminiBackend::new(key, config.primary.model.clone()),
        None => GeminiBackend::from_env(config.primary.model.clone())
            .context("primary backend needs an API key")?,
    };
    let primary = match &config.primary.base_url {
        Some(url) => primary.with_base_url(url.clone()),
        None => primary,
    };

    let fallback = match config.fallback.api_key.clone() {
        Some(key) => HuggingFaceBackend::new(key, config.fallback.model.clone()),
        None => HuggingFaceBackend::from_env(config.fallback.model.clone())
            .context("fallback backend needs an API key")?,
    };
    let fallback = match &config.fallback.base_url {
        Some(url) => fallback.with_base_url(url.clone()),
        None => fallback,
    };

    let params = GenerationParams {
        max_new_tokens: config.chat.max_new_tokens,
        temperature: config.chat.temperature,
        repetition_penalty: config.chat.repetition_penalty,
    };

    let router = CompletionRouter::new(
        vec![
            Arc::new(primary) as Arc<dyn TextBackend>,
            Arc::new(fallback) as Arc<dyn TextBackend>,
        ],
        params,
    )?;

    info!("completion chain: {}", router.backend_ids().join(" -> "));
    Ok(router)
}
