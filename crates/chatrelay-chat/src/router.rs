use std::sync::Arc;

use chatrelay_common::{Error, Result};
use tracing::{info, warn};

use crate::backends::{GenerationParams, TextBackend};

/// Routes a completion request through an ordered chain of backends.
///
/// Each backend gets a single attempt per request. Any failure (transport,
/// non-success status, malformed body) moves control to the next backend in
/// the chain; the cause is logged but does not change control flow. Only
/// when every backend has failed does the router surface an error, carrying
/// each backend's cause.
pub struct CompletionRouter {
    backends: Vec<Arc<dyn TextBackend>>,
    params: GenerationParams,
}

impl std::fmt::Debug for CompletionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRouter")
            .field("backends", &self.backend_ids())
            .field("params", &self.params)
            .finish()
    }
}

impl CompletionRouter {
    pub fn new(backends: Vec<Arc<dyn TextBackend>>, params: GenerationParams) -> Result<Self> {
        if backends.is_empty() {
            return Err(Error::Config("no completion backend configured".to_string()));
        }
        Ok(Self { backends, params })
    }

    /// IDs of the configured backends, in priority order.
    pub fn backend_ids(&self) -> Vec<String> {
        self.backends
            .iter()
            .map(|b| b.backend_id().to_string())
            .collect()
    }

    pub async fn complete(&self, context: &str) -> Result<String> {
        let mut causes = Vec::new();

        for (index, backend) in self.backends.iter().enumerate() {
            let backend_id = backend.backend_id();
            match backend.generate(context, &self.params).await {
                Ok(reply) => {
                    if index > 0 {
                        info!(
                            "backend '{}' served the completion after primary failure",
                            backend_id
                        );
                    }
                    return Ok(reply);
                }
                Err(err) => {
                    warn!("backend '{}' failed: {}", backend_id, err);
                    causes.push(format!("{backend_id}: {err}"));
                }
            }
        }

        Err(Error::BackendsExhausted(causes.join("; ")))
    }

    /// Probe every backend in the chain and report reachability per ID.
    pub async fn health(&self) -> Vec<(String, bool)> {
        let mut checks = Vec::new();
        for backend in &self.backends {
            let healthy = backend.health_check().await.unwrap_or(false);
            checks.push((backend.backend_id().to_string(), healthy));
        }
        checks
    }
}
