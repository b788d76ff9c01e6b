use std::path::PathBuf;

use serde::Deserialize;

/// Process-wide configuration. Built once at startup and held immutably
/// for the process lifetime.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub chat: ChatConfig,
    pub primary: GeminiConfig,
    pub fallback: HuggingFaceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chatrelay.db"),
        }
    }
}

/// Tunables for the completion pipeline. The sampling values are passed
/// through to the backends unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub window_limit: usize,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub repetition_penalty: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_limit: 6,
            max_new_tokens: 200,
            temperature: 0.7,
            repetition_penalty: 1.1,
        }
    }
}

/// Primary backend. The API key is usually resolved from `GEMINI_API_KEY`
/// rather than written into the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Fallback backend. The API key is usually resolved from `HF_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}
