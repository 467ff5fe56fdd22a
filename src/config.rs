//! Configuration loader and validator for the backend binding.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ENV_URL: &str = "BACKEND_URL";
pub const ENV_ANON_KEY: &str = "BACKEND_ANON_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    #[serde(default)]
    pub auth: AuthOptions,
    #[serde(default)]
    pub enrichment: Enrichment,
}

/// Connection secrets for the hosted database.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backend {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthFlow {
    Pkce,
    Implicit,
}

/// Options handed to the auth layer. This crate only records them; token
/// refresh and session storage belong to the auth SDK.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    pub flow: AuthFlow,
    pub auto_refresh_token: bool,
    pub persist_session: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            flow: AuthFlow::Pkce,
            auto_refresh_token: true,
            persist_session: true,
        }
    }
}

/// Notification enrichment fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrichment {
    pub max_concurrency: usize,
}

impl Default for Enrichment {
    fn default() -> Self {
        Self {
            max_concurrency: crate::fanout::DEFAULT_CONCURRENCY,
        }
    }
}

fn default_schema() -> String {
    "public".to_string()
}

impl Config {
    /// Overlay secrets from a variable lookup (normally the process
    /// environment). Empty values are ignored so they cannot blank out a file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.trim().is_empty()) {
            self.backend.anon_key = key;
        }
    }
}

/// Load configuration from a YAML file, overlay environment secrets and
/// validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_overrides(|k| std::env::var(k).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Build configuration from the environment alone, with default auth options.
pub fn from_env() -> Result<Config, ConfigError> {
    let mut cfg = Config {
        backend: Backend {
            schema: default_schema(),
            ..Default::default()
        },
        auth: AuthOptions::default(),
        enrichment: Enrichment::default(),
    };
    cfg.apply_overrides(|k| std::env::var(k).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.backend.url.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.url must be non-empty"));
    }
    if cfg.backend.anon_key.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.anon_key must be non-empty"));
    }
    if cfg.backend.schema.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.schema must be non-empty"));
    }
    if cfg.enrichment.max_concurrency == 0 {
        return Err(ConfigError::Invalid("enrichment.max_concurrency must be > 0"));
    }
    Ok(())
}

/// Returns the example YAML content.
pub fn example() -> &'static str {
    r#"backend:
  url: "https://YOUR_PROJECT.example.co"
  anon_key: "YOUR_PUBLIC_ANON_KEY"
  schema: "public"

auth:
  flow: "pkce"
  auto_refresh_token: true
  persist_session: true

enrichment:
  max_concurrency: 8
"#
}
