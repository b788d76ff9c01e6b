use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared across the workspace.
///
/// `Backend` is a per-attempt failure and never crosses the completion
/// router's boundary on its own; once every backend in the chain has failed
/// the router surfaces a single `BackendsExhausted` carrying each cause.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("all completion backends failed: {0}")]
    BackendsExhausted(String),

    #[error("config error: {0}")]
    Config(String),
}
