use async_trait::async_trait;
use chatrelay_common::{Error, Result};
use reqwest::Client;
use serde_json::json;
use std::env;

use super::{GenerationParams, TextBackend};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Primary completion backend: Google's Gemini generateContent API.
pub struct GeminiBackend {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn from_env(model: String) -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key, model))
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn backend_id(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, context: &str, params: &GenerationParams) -> Result<String> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": context }]
            }],
            "generationConfig": {
                "maxOutputTokens": params.max_new_tokens,
                "temperature": params.temperature,
            }
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Gemini network error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("malformed Gemini response: {e}")))?;

        let text = raw["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| Error::Backend("Gemini response missing generated text".to_string()))?;

        Ok(text.trim().to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}
