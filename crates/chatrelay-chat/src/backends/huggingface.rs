use async_trait::async_trait;
use chatrelay_common::{Error, Result};
use reqwest::Client;
use serde_json::json;
use std::env;

use super::{GenerationParams, TextBackend};

const HF_API_URL: &str = "https://api-inference.huggingface.co";

/// Fallback completion backend: the Hugging Face hosted inference API.
///
/// Requests are sent with `wait_for_model=true`, so a call against a cold
/// model blocks until the backend is warm instead of failing immediately.
pub struct HuggingFaceBackend {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl HuggingFaceBackend {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: HF_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn from_env(model: String) -> Result<Self> {
        let api_key =
            env::var("HF_API_KEY").map_err(|_| Error::Config("HF_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key, model))
    }
}

#[async_trait]
impl TextBackend for HuggingFaceBackend {
    fn backend_id(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, context: &str, params: &GenerationParams) -> Result<String> {
        let body = json!({
            "inputs": context,
            "parameters": {
                "max_new_tokens": params.max_new_tokens,
                "temperature": params.temperature,
                "repetition_penalty": params.repetition_penalty,
                "do_sample": true,
                "return_full_text": false
            },
            "options": {
                "use_cache": false,
                "wait_for_model": true
            }
        });

        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Hugging Face network error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "Hugging Face API error ({status}): {error_text}"
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("malformed Hugging Face response: {e}")))?;

        // The inference API wraps its reply in a single-element array.
        let text = raw[0]["generated_text"].as_str().ok_or_else(|| {
            Error::Backend("Hugging Face response missing generated text".to_string())
        })?;

        Ok(text.trim().to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
