use async_trait::async_trait;
use chatrelay_common::Result;
use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod huggingface;

pub use gemini::GeminiBackend;
pub use huggingface::HuggingFaceBackend;

/// Trait for text-generation backend integrations (Gemini, Hugging Face,
/// etc.). Implementations normalize their provider's response envelope to a
/// single trimmed reply string; callers never see backend-specific
/// structure.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Backend identifier (e.g. "gemini", "huggingface").
    fn backend_id(&self) -> &str;

    /// Submit a rendered context with generation parameters and return the
    /// generated text.
    async fn generate(&self, context: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the backend is reachable and configured.
    async fn health_check(&self) -> Result<bool>;
}

/// Generation tunables passed through to the backends unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub repetition_penalty: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            temperature: 0.7,
            repetition_penalty: 1.1,
        }
    }
}
