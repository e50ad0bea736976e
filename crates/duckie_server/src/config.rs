//! Server configuration

use std::path::Path;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use duckie_core::config::{self as core_config, ModelConfig};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

use crate::error::{ServerError, ServerResult};

/// Everything the server reads from its TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load from an explicit path, or the first standard location that
    /// exists, or fall back to defaults.
    pub async fn load(explicit: Option<&Path>) -> ServerResult<Self> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from {}", path.display());
            return Ok(core_config::load_toml(path).await?);
        }

        for path in core_config::config_paths() {
            if path.exists() {
                tracing::info!("Loading config from {}", path.display());
                return Ok(core_config::load_toml(&path).await?);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (e.g., "127.0.0.1:8080")
    pub bind_address: String,

    /// CORS configuration
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Seconds browsers may cache a preflight answer
    pub max_age: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    pub fn layer(&self) -> ServerResult<CorsLayer> {
        let origin = if self.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o)
                        .map_err(|e| ServerError::Config(format!("invalid CORS origin '{o}': {e}")))
                })
                .collect::<ServerResult<Vec<_>>>()?;
            AllowOrigin::list(origins)
        };

        let methods = self
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.as_bytes())
                    .map_err(|e| ServerError::Config(format!("invalid CORS method '{m}': {e}")))
            })
            .collect::<ServerResult<Vec<_>>>()?;

        let headers = if self.allowed_headers.iter().any(|h| h == "*") {
            AllowHeaders::from(Any)
        } else {
            let names = self
                .allowed_headers
                .iter()
                .map(|h| {
                    HeaderName::from_bytes(h.as_bytes())
                        .map_err(|e| ServerError::Config(format!("invalid CORS header '{h}': {e}")))
                })
                .collect::<ServerResult<Vec<_>>>()?;
            AllowHeaders::list(names)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(Duration::from_secs(self.max_age)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind_address = "0.0.0.0:3000"

            [server.cors]
            allowed_origins = ["http://localhost:9002"]
            max_age = 600

            [model]
            model = "gemini-1.5-flash"
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.cors.allowed_origins, vec!["http://localhost:9002"]);
        assert_eq!(config.server.cors.allowed_methods, vec!["GET", "POST"]);
        assert_eq!(config.model.model, "gemini-1.5-flash");
        assert_eq!(config.model.temperature, Some(0.2));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn test_cors_layer_rejects_bad_origin() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://ok.example".into(), "bad\norigin".into()],
            ..Default::default()
        };
        assert!(matches!(cors.layer(), Err(ServerError::Config(_))));
        assert!(CorsConfig::default().layer().is_ok());
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/duckiemind.toml"))).await;
        assert!(matches!(result, Err(ServerError::Core(_))));
    }
}
