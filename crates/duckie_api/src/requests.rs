//! API request types
//!
//! Action endpoints accept `application/x-www-form-urlencoded` bodies. These
//! forms are the typed client-side view; the server reads raw [`FormFields`]
//! so that missing fields reach validation instead of failing extraction.

use duckie_core::capability::Exam;
use duckie_core::schema::{self, FormFields};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body for `POST /actions/study-recommendations`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecommendationsForm {
    pub course: String,
    pub learning_style: String,
    pub study_goals: String,
}

impl From<StudyRecommendationsForm> for FormFields {
    fn from(form: StudyRecommendationsForm) -> Self {
        FormFields::new()
            .with(schema::COURSE, form.course)
            .with(schema::LEARNING_STYLE, form.learning_style)
            .with(schema::STUDY_GOALS, form.study_goals)
    }
}

/// Body for `POST /actions/stress-feedback`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StressFeedbackForm {
    pub situation: String,
}

impl From<StressFeedbackForm> for FormFields {
    fn from(form: StressFeedbackForm) -> Self {
        FormFields::new().with(schema::SITUATION, form.situation)
    }
}

/// Body for `POST /actions/study-schedule`
///
/// On the wire `exams` is a single field holding a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StudyScheduleForm {
    pub exams: Vec<Exam>,
}

impl StudyScheduleForm {
    pub fn into_fields(self) -> serde_json::Result<FormFields> {
        let exams = serde_json::to_string(&self.exams)?;
        Ok(FormFields::new().with(schema::EXAMS, exams))
    }
}
