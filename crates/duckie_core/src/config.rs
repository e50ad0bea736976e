//! Configuration for the model provider plus the shared file-loading helpers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::error::{ConfigError, CoreError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Environment variables checked, in order, for the provider API key
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GENAI_API_KEY"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
}

/// Model provider configuration (`[model]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefer the environment; this is for local setups only
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Per-request timeout; no timeout when unset. Zero is rejected.
    #[serde(
        default,
        deserialize_with = "nonzero_timeout",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout_secs: Option<u64>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> Option<f32> {
    Some(DEFAULT_TEMPERATURE)
}

fn nonzero_timeout<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u64>::deserialize(deserializer)? {
        Some(0) => Err(serde::de::Error::custom(
            "request_timeout_secs must be at least 1; leave it out for no timeout",
        )),
        secs => Ok(secs),
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_output_tokens: None,
            request_timeout_secs: None,
        }
    }
}

impl ModelConfig {
    /// The configured key, else the first non-empty key variable in the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|name| lookup(name).filter(|k| !k.trim().is_empty()))
            })
    }
}

/// Read and parse a TOML file into any config type
pub async fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CoreError::config_error(
            path.display().to_string(),
            "file",
            "readable TOML file",
            ConfigError::Io(e),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        CoreError::config_error(
            path.display().to_string(),
            "content",
            "valid TOML configuration",
            ConfigError::TomlParse(e),
        )
    })
}

/// Standard config locations, most specific first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("duckiemind.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("duckiemind").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".duckiemind").join("config.toml"));
    }

    paths
}

/// Load a `.env` file from the working directory, if there is one
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }
}
