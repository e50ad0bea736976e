//! HTTP request handlers

use axum::{
    Router,
    routing::{get, post},
};
use duckie_api::paths;

pub mod actions;
pub mod health;
pub mod wellness;

use crate::state::AppState;

/// Build all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route(paths::HEALTH, get(health::health_check))
        // Capability actions
        .route(
            paths::STUDY_RECOMMENDATIONS,
            post(actions::study_recommendations),
        )
        .route(paths::STRESS_FEEDBACK, post(actions::stress_feedback))
        .route(paths::STUDY_SCHEDULE, post(actions::study_schedule))
        // Wellness content
        .route(paths::QUOTES, get(wellness::list_quotes))
        .route(paths::QUOTE, get(wellness::get_quote))
        .route(paths::NEXT_QUOTE, get(wellness::next_quote))
        .route(paths::BREATHING, get(wellness::breathing))
}
