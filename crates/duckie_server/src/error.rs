//! Server error types
//!
//! These only surface while starting up; request handlers answer with
//! action states or [`duckie_api::ApiError`].

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ServerError {
    #[error("Core error: {0}")]
    #[diagnostic(transparent)]
    Core(#[from] duckie_core::CoreError),

    #[error("Invalid address: {0}")]
    #[diagnostic(help("Use host:port, for example 127.0.0.1:8080"))]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    #[diagnostic(help("Check the [server] section of the config file"))]
    Config(String),
}
