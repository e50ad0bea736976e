use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Model provider error")]
    #[diagnostic(
        code(duckie_core::model_provider_error),
        help("Check API credentials and model availability for {provider}/{model}")
    )]
    ModelProviderError {
        provider: String,
        model: String,
        #[source]
        cause: ModelError,
    },

    #[error("Failed to render prompt template '{template}'")]
    #[diagnostic(
        code(duckie_core::template_error),
        help("Every placeholder in the template must be supplied by the request")
    )]
    TemplateError {
        template: String,
        #[source]
        cause: minijinja::Error,
    },

    #[error("Serialization error")]
    #[diagnostic(
        code(duckie_core::serialization_error),
        help("Failed to serialize/deserialize {data_type}")
    )]
    SerializationError {
        data_type: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("Configuration error")]
    #[diagnostic(
        code(duckie_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },

    #[error("No API key configured for {provider}")]
    #[diagnostic(
        code(duckie_core::missing_api_key),
        help("Set one of {env_vars} or add api_key under [model]")
    )]
    MissingApiKey {
        provider: String,
        /// Comma-separated variables that were checked
        env_vars: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures at the boundary with the hosted model.
#[derive(Error, Diagnostic, Debug)]
pub enum ModelError {
    #[error("Request to the model provider failed")]
    #[diagnostic(code(duckie_core::model::transport))]
    Transport(#[source] reqwest::Error),

    #[error("Model provider returned HTTP {status}")]
    #[diagnostic(code(duckie_core::model::status))]
    Status { status: u16, body: String },

    #[error("Model provider rate limit exceeded")]
    #[diagnostic(
        code(duckie_core::model::rate_limited),
        help("Wait before retrying or raise the quota for this key")
    )]
    RateLimited { body: String },

    #[error("Model provider rejected the credentials (HTTP {status})")]
    #[diagnostic(
        code(duckie_core::model::unauthorized),
        help("Check that the API key is valid for the configured model")
    )]
    Unauthorized { status: u16 },

    #[error("Model refused to answer: {reason}")]
    #[diagnostic(code(duckie_core::model::rejected))]
    Rejected { reason: String },

    #[error("Model reply did not match the expected shape: {reason}")]
    #[diagnostic(code(duckie_core::model::malformed_reply))]
    MalformedReply { reason: String },

    #[error("Model provider unavailable: {reason}")]
    #[diagnostic(code(duckie_core::model::unavailable))]
    Unavailable { reason: String },
}

impl ModelError {
    /// Classify a non-success HTTP status from the provider.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            429 => Self::RateLimited { body },
            _ => Self::Status { status, body },
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedReply {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// Helper functions for creating common errors with context
impl CoreError {
    pub fn model_error(
        provider: impl Into<String>,
        model: impl Into<String>,
        cause: ModelError,
    ) -> Self {
        Self::ModelProviderError {
            provider: provider.into(),
            model: model.into(),
            cause,
        }
    }

    pub fn template_error(template: impl Into<String>, cause: minijinja::Error) -> Self {
        Self::TemplateError {
            template: template.into(),
            cause,
        }
    }

    pub fn config_error(
        config_path: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        cause: ConfigError,
    ) -> Self {
        Self::ConfigurationError {
            config_path: config_path.into(),
            field: field.into(),
            expected: expected.into(),
            cause,
        }
    }
}
