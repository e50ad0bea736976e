//! DuckieMind API types and definitions
//!
//! Request and response types for the DuckieMind HTTP API, shared between
//! the server and any client.

pub mod error;
pub mod requests;
pub mod responses;

pub use error::ApiError;
pub use requests::{StressFeedbackForm, StudyRecommendationsForm, StudyScheduleForm};
pub use responses::{ActionResult, FieldErrors, HealthResponse};

// Re-export the core types that appear on the wire
pub use duckie_core::capability::{Capability, CapabilityResponse, Exam};
pub use duckie_core::schema::FormFields;

/// API version constant
pub const API_VERSION: &str = "v1";

/// Route paths, relative to `/api/{API_VERSION}`
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const STUDY_RECOMMENDATIONS: &str = "/actions/study-recommendations";
    pub const STRESS_FEEDBACK: &str = "/actions/stress-feedback";
    pub const STUDY_SCHEDULE: &str = "/actions/study-schedule";
    pub const QUOTES: &str = "/quotes";
    pub const QUOTE: &str = "/quotes/:id";
    pub const NEXT_QUOTE: &str = "/quotes/:id/next";
    pub const BREATHING: &str = "/breathing";
}

/// Prefix every route is nested under
pub fn api_prefix() -> String {
    format!("/api/{}", API_VERSION)
}
