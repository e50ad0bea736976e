//! API error types

use miette::Diagnostic;
use serde::{Deserialize, Serialize};

/// API error response
///
/// Action endpoints never produce one of these: their outcomes, failures
/// included, travel in the [`ActionResult`](crate::ActionResult) body.
#[derive(Debug, thiserror::Error, Diagnostic, Serialize, Deserialize)]
pub enum ApiError {
    /// Resource not found
    #[error("Resource not found: {resource_type}")]
    #[diagnostic(
        code(api::not_found),
        help("The {resource_type} with ID '{resource_id}' does not exist")
    )]
    NotFound {
        resource_type: String,
        resource_id: String,
    },
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } => 404,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "not_found",
        }
    }

    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// JSON body sent to clients
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            },
            "timestamp": chrono::Utc::now(),
        })
    }
}

// Server-side response conversion
#[cfg(feature = "server")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.to_body())).into_response()
    }
}
