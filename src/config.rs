use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{AppError, Result};

pub const DEFAULT_GIST_ID: &str = "4b22b5fe7fb33a8ba84d99ec105f1938";
pub const DEFAULT_GIST_FILE: &str = "clarksonTributes.json";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const DEFAULT_PORT: u16 = 8888;

/// Where the tributes live upstream.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GistConfig {
    pub id: String,
    pub file_name: String,
    pub api_base: String,
    pub user_agent: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_GIST_ID.into(),
            file_name: DEFAULT_GIST_FILE.into(),
            api_base: DEFAULT_GITHUB_API.into(),
            user_agent: concat!("ClarksonBot-Function/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl GistConfig {
    pub fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.api_base.trim_end_matches('/'), self.id)
    }
}

/// Server configuration. The GitHub credential is deliberately absent: only the
/// name of the environment variable holding it is kept, and it is read per request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub port: u16,
    pub token_var: String,
    pub gist: GistConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            token_var: DEFAULT_TOKEN_VAR.into(),
            gist: GistConfig::default(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".clarksonbot").join("config.json"))
}

impl Config {
    /// Defaults, then `~/.clarksonbot/config.json` if present, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                serde_json::from_str(&content).map_err(|e| {
                    AppError::Custom(format!("Invalid config file {}: {e}", path.display()))
                })?
            }
            _ => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CLARKSONBOT_*` overrides from any key lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("CLARKSONBOT_PORT") {
            self.port = port.trim().parse().map_err(|e| {
                warn!("Invalid CLARKSONBOT_PORT value: {e}");
                AppError::Custom(format!("Invalid CLARKSONBOT_PORT '{port}': {e}"))
            })?;
        }
        if let Some(id) = lookup("CLARKSONBOT_GIST_ID") {
            self.gist.id = id;
        }
        if let Some(file) = lookup("CLARKSONBOT_GIST_FILE") {
            self.gist.file_name = file;
        }
        if let Some(api) = lookup("CLARKSONBOT_GITHUB_API") {
            self.gist.api_base = api;
        }
        if let Some(var) = lookup("CLARKSONBOT_TOKEN_VAR") {
            self.token_var = var;
        }
        Ok(())
    }

    /// Read the write credential from the environment. Blank counts as missing.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
