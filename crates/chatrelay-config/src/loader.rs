use std::env;
use std::path::{Path, PathBuf};

use chatrelay_common::{Error, Result};
use tracing::info;

use crate::model::AppConfig;

/// Default config file looked up in the working directory when no explicit
/// path is given.
const DEFAULT_CONFIG_FILE: &str = "chatrelay.toml";

/// Loads `AppConfig` from an optional TOML file, then applies environment
/// overrides. Secrets (`GEMINI_API_KEY`, `HF_API_KEY`) and the `PORT`
/// override always come from the environment when set.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn load(&self) -> Result<AppConfig> {
        let mut config = match &self.path {
            Some(path) => Self::read_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::read_file(default_path)?
                } else {
                    AppConfig::default()
                }
            }
        };

        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<AppConfig> {
        info!("loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<AppConfig> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("invalid config file: {e}")))
    }
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(key) = env::var("GEMINI_API_KEY")
        && !key.is_empty()
    {
        config.primary.api_key = Some(key);
    }

    if let Ok(key) = env::var("HF_API_KEY")
        && !key.is_empty()
    {
        config.fallback.api_key = Some(key);
    }

    if let Ok(port) = env::var("PORT")
        && !port.is_empty()
    {
        config.gateway.port = port
            .parse()
            .map_err(|_| Error::Config(format!("invalid PORT value '{port}'")))?;
    }

    Ok(())
}
