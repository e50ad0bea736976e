//! Health check endpoint

use axum::{Json, extract::State};
use duckie_api::responses::{ComponentStatus, HealthResponse, HealthStatus, ServiceStatus};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.flows.provider();
    let model = if state.model_ready {
        ServiceStatus {
            name: format!("{}:{}", provider.name(), provider.model()),
            status: ComponentStatus::Ok,
            message: None,
        }
    } else {
        ServiceStatus {
            name: format!("{}:{}", provider.name(), provider.model()),
            status: ComponentStatus::Warning,
            message: Some("No API key configured".to_string()),
        }
    };

    let status = match model.status {
        ComponentStatus::Ok => HealthStatus::Healthy,
        ComponentStatus::Warning => HealthStatus::Degraded,
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        services: vec![model],
    })
}
