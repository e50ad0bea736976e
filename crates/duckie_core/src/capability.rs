//! The three things DuckieMind can be asked to do, and the typed requests
//! and replies that go with them.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    StudyRecommendations,
    StressFeedback,
    StudySchedule,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::StudyRecommendations => "study_recommendations",
            Capability::StressFeedback => "stress_feedback",
            Capability::StudySchedule => "study_schedule",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for study method recommendations.
///
/// Field names serialize the way the prompt templates reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecommendationRequest {
    pub course: String,
    pub learning_style: String,
    pub study_goals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StressFeedbackRequest {
    pub situation: String,
}

/// An upcoming exam. The date is free text and is passed through as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Exam {
    pub title: String,
    pub date: String,
}

impl Exam {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
        }
    }
}

/// Exams in the order the caller listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleRequest {
    pub exams: Vec<Exam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityRequest {
    StudyRecommendations(StudyRecommendationRequest),
    StressFeedback(StressFeedbackRequest),
    StudySchedule(ScheduleRequest),
}

impl CapabilityRequest {
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityRequest::StudyRecommendations(_) => Capability::StudyRecommendations,
            CapabilityRequest::StressFeedback(_) => Capability::StressFeedback,
            CapabilityRequest::StudySchedule(_) => Capability::StudySchedule,
        }
    }
}

impl From<StudyRecommendationRequest> for CapabilityRequest {
    fn from(request: StudyRecommendationRequest) -> Self {
        CapabilityRequest::StudyRecommendations(request)
    }
}

impl From<StressFeedbackRequest> for CapabilityRequest {
    fn from(request: StressFeedbackRequest) -> Self {
        CapabilityRequest::StressFeedback(request)
    }
}

impl From<ScheduleRequest> for CapabilityRequest {
    fn from(request: ScheduleRequest) -> Self {
        CapabilityRequest::StudySchedule(request)
    }
}

/// Generated text for a capability. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityResponse {
    Recommendations(String),
    Feedback(String),
    Schedule(String),
}

impl CapabilityResponse {
    /// Wraps generated text, returning `None` when there is nothing to show.
    pub fn non_blank(capability: Capability, text: Option<String>) -> Option<Self> {
        let text = text.filter(|t| !t.trim().is_empty())?;
        Some(match capability {
            Capability::StudyRecommendations => CapabilityResponse::Recommendations(text),
            Capability::StressFeedback => CapabilityResponse::Feedback(text),
            Capability::StudySchedule => CapabilityResponse::Schedule(text),
        })
    }

    pub fn capability(&self) -> Capability {
        match self {
            CapabilityResponse::Recommendations(_) => Capability::StudyRecommendations,
            CapabilityResponse::Feedback(_) => Capability::StressFeedback,
            CapabilityResponse::Schedule(_) => Capability::StudySchedule,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            CapabilityResponse::Recommendations(text)
            | CapabilityResponse::Feedback(text)
            | CapabilityResponse::Schedule(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_text_is_not_a_response() {
        assert_eq!(
            CapabilityResponse::non_blank(Capability::StressFeedback, None),
            None
        );
        assert_eq!(
            CapabilityResponse::non_blank(Capability::StressFeedback, Some(" \n\t".into())),
            None
        );

        let response =
            CapabilityResponse::non_blank(Capability::StudySchedule, Some("## Monday".into()))
                .unwrap();
        assert_eq!(response.capability(), Capability::StudySchedule);
        assert_eq!(response.text(), "## Monday");
    }

    #[test]
    fn test_request_field_names() {
        let request = StudyRecommendationRequest {
            course: "Biology".into(),
            learning_style: "Visual".into(),
            study_goals: "Pass the final exam".into(),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["learningStyle"], "Visual");
        assert_eq!(value["studyGoals"], "Pass the final exam");
    }
}
