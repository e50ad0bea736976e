//! DuckieMind API Server library
//!
//! HTTP front end for the capability flows and the wellness content.

pub mod actions;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, CorsConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use state::AppState;

/// Build the full application router for the given state
pub fn app(state: AppState) -> ServerResult<Router> {
    let cors = state.config.server.cors.layer()?;

    Ok(Router::new()
        .nest(&duckie_api::api_prefix(), handlers::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the DuckieMind API server
pub async fn start_server(config: AppConfig) -> ServerResult<()> {
    use std::net::SocketAddr;

    tracing::info!("Starting DuckieMind API Server on {}", config.server.bind_address);

    // Parse address before doing any other work
    let addr: SocketAddr = config.server.bind_address.parse()?;

    let state = AppState::new(config)?;
    let app = app(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
