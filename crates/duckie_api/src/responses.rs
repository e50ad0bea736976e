//! API response types

use std::collections::BTreeMap;

use duckie_core::capability::{Capability, CapabilityResponse};
use duckie_core::schema::ValidationErrors;
use duckie_core::wellness::{self, BreathingPhase, Quote};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Messages per field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// State returned by every action endpoint
///
/// Only the payload field for the action's capability is ever set, and only
/// on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>, response: CapabilityResponse) -> Self {
        let mut result = Self::message(message);
        match response {
            CapabilityResponse::Recommendations(text) => result.recommendations = Some(text),
            CapabilityResponse::Feedback(text) => result.feedback = Some(text),
            CapabilityResponse::Schedule(text) => result.schedule = Some(text),
        }
        result
    }

    pub fn invalid(message: impl Into<String>, errors: &ValidationErrors) -> Self {
        Self {
            errors: Some(errors.to_field_messages()),
            ..Self::message(message)
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// The generated text, if this result carries any
    pub fn payload(&self) -> Option<CapabilityResponse> {
        if let Some(text) = &self.recommendations {
            return Some(CapabilityResponse::Recommendations(text.clone()));
        }
        if let Some(text) = &self.feedback {
            return Some(CapabilityResponse::Feedback(text.clone()));
        }
        self.schedule
            .as_ref()
            .map(|text| CapabilityResponse::Schedule(text.clone()))
    }

    pub fn capability(&self) -> Option<Capability> {
        self.payload().map(|p| p.capability())
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub services: Vec<ServiceStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceStatus {
    pub name: String,
    pub status: ComponentStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuoteResponse {
    pub id: u32,
    pub text: String,
}

impl From<&Quote> for QuoteResponse {
    fn from(quote: &Quote) -> Self {
        Self {
            id: quote.id,
            text: quote.text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteListResponse {
    pub quotes: Vec<QuoteResponse>,
}

impl QuoteListResponse {
    pub fn all() -> Self {
        Self {
            quotes: wellness::QUOTES.iter().map(QuoteResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BreathingPhaseResponse {
    pub name: String,
    pub duration_ms: u64,
}

impl From<&BreathingPhase> for BreathingPhaseResponse {
    fn from(phase: &BreathingPhase) -> Self {
        Self {
            name: phase.name.to_string(),
            duration_ms: phase.duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BreathingResponse {
    pub phases: Vec<BreathingPhaseResponse>,
    pub cycle_ms: u64,
}

impl BreathingResponse {
    pub fn standard() -> Self {
        Self {
            phases: wellness::BREATHING_PHASES
                .iter()
                .map(BreathingPhaseResponse::from)
                .collect(),
            cycle_ms: wellness::cycle_duration().as_millis() as u64,
        }
    }
}
