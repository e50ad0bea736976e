//! Application state

use std::sync::Arc;
use std::time::Instant;

use duckie_core::{Flows, ModelProvider, model};

use crate::{config::AppConfig, error::ServerResult};

/// Shared, immutable state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub flows: Arc<Flows>,
    /// Whether the model provider has credentials
    pub model_ready: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> ServerResult<Self> {
        let provider = model::create_provider(&config.model)?;
        let model_ready = config.model.resolve_api_key().is_some();

        Ok(Self::with_provider(config, provider)?.with_model_ready(model_ready))
    }

    /// State backed by a specific provider, e.g. a mock in tests
    pub fn with_provider(config: AppConfig, provider: Arc<dyn ModelProvider>) -> ServerResult<Self> {
        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            "Initializing capability flows"
        );
        Ok(Self {
            config: Arc::new(config),
            flows: Arc::new(Flows::new(provider)?),
            model_ready: true,
            started_at: Instant::now(),
        })
    }

    /// Record whether the provider can actually reach the model
    pub fn with_model_ready(mut self, ready: bool) -> Self {
        self.model_ready = ready;
        self
    }
}
