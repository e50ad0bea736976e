//! Validation of raw form input into typed capability requests.
//!
//! Every rule is checked and every failure is collected, so a caller gets
//! the full list of problems per field in one pass.

use std::collections::{BTreeMap, HashMap};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::{
    Capability, CapabilityRequest, Exam, ScheduleRequest, StressFeedbackRequest,
    StudyRecommendationRequest,
};

pub const COURSE: &str = "course";
pub const LEARNING_STYLE: &str = "learningStyle";
pub const STUDY_GOALS: &str = "studyGoals";
pub const SITUATION: &str = "situation";
pub const EXAMS: &str = "exams";

pub const REQUIRED_MESSAGE: &str = "Required";
pub const COURSE_TOO_SHORT: &str = "Course name must be at least 2 characters.";
pub const STUDY_GOALS_TOO_SHORT: &str = "Study goals must be at least 10 characters.";
pub const SITUATION_TOO_SHORT: &str =
    "Please describe your situation in at least 15 characters.";
pub const EXAMS_MALFORMED: &str = "Exams must be a JSON array of objects with a title and a date.";
pub const NO_EXAMS_MESSAGE: &str = "Please add at least one exam to get a schedule recommendation.";

const COURSE_MIN: usize = 2;
const STUDY_GOALS_MIN: usize = 10;
const SITUATION_MIN: usize = 15;

/// Raw string fields as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    MinLength(usize),
    Malformed,
    NonEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub constraint: Constraint,
    pub message: String,
}

impl Violation {
    pub fn new(constraint: Constraint, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
        }
    }
}

/// Per-field validation failures. Only fields that failed appear.
#[derive(Error, Diagnostic, Debug, Clone, Default, PartialEq, Eq)]
#[error("Validation failed for {} field(s)", .fields.len())]
#[diagnostic(
    code(duckie_core::validation_failed),
    help("Check the field errors for the specific problems")
)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<Violation>>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, violation: Violation) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn get(&self, field: &str) -> Option<&[Violation]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// True when every recorded violation has the given constraint.
    pub fn only(&self, constraint: Constraint) -> bool {
        !self.is_empty()
            && self
                .fields
                .values()
                .flatten()
                .all(|v| v.constraint == constraint)
    }

    /// Messages per field, in the order they were found.
    pub fn to_field_messages(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(field, violations)| {
                (
                    field.clone(),
                    violations.iter().map(|v| v.message.clone()).collect(),
                )
            })
            .collect()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Validate raw fields for the given capability.
pub fn validate(
    capability: Capability,
    fields: &FormFields,
) -> Result<CapabilityRequest, ValidationErrors> {
    match capability {
        Capability::StudyRecommendations => validate_study_recommendations(fields).map(Into::into),
        Capability::StressFeedback => validate_stress_feedback(fields).map(Into::into),
        Capability::StudySchedule => validate_study_schedule(fields).map(Into::into),
    }
}

pub fn validate_study_recommendations(
    fields: &FormFields,
) -> Result<StudyRecommendationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let course = required(fields, COURSE, &mut errors);
    if let Some(course) = course {
        min_length(course, COURSE, COURSE_MIN, COURSE_TOO_SHORT, &mut errors);
    }
    let learning_style = required(fields, LEARNING_STYLE, &mut errors);
    let study_goals = required(fields, STUDY_GOALS, &mut errors);
    if let Some(goals) = study_goals {
        min_length(
            goals,
            STUDY_GOALS,
            STUDY_GOALS_MIN,
            STUDY_GOALS_TOO_SHORT,
            &mut errors,
        );
    }

    errors.into_result(|| StudyRecommendationRequest {
        course: course.unwrap_or_default().to_string(),
        learning_style: learning_style.unwrap_or_default().to_string(),
        study_goals: study_goals.unwrap_or_default().to_string(),
    })
}

pub fn validate_stress_feedback(
    fields: &FormFields,
) -> Result<StressFeedbackRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let situation = required(fields, SITUATION, &mut errors);
    if let Some(situation) = situation {
        min_length(
            situation,
            SITUATION,
            SITUATION_MIN,
            SITUATION_TOO_SHORT,
            &mut errors,
        );
    }

    errors.into_result(|| StressFeedbackRequest {
        situation: situation.unwrap_or_default().to_string(),
    })
}

/// The `exams` field carries a JSON-encoded array of `{title, date}` objects.
pub fn validate_study_schedule(fields: &FormFields) -> Result<ScheduleRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(raw) = required(fields, EXAMS, &mut errors) else {
        return Err(errors);
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("exams field is not a JSON array: {}", e);
            errors.push(EXAMS, Violation::new(Constraint::Malformed, EXAMS_MALFORMED));
            return Err(errors);
        }
    };

    if entries.is_empty() {
        errors.push(EXAMS, Violation::new(Constraint::NonEmpty, NO_EXAMS_MESSAGE));
        return Err(errors);
    }

    let mut exams = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let number = index + 1;
        let Some(object) = entry.as_object() else {
            errors.push(
                EXAMS,
                Violation::new(
                    Constraint::Malformed,
                    format!("Exam {number} must be an object with a title and a date."),
                ),
            );
            continue;
        };

        let title = text_member(object, "title");
        let date = text_member(object, "date");
        if title.is_none() {
            errors.push(
                EXAMS,
                Violation::new(
                    Constraint::Required,
                    format!("Exam {number} is missing a title."),
                ),
            );
        }
        if date.is_none() {
            errors.push(
                EXAMS,
                Violation::new(
                    Constraint::Required,
                    format!("Exam {number} is missing a date."),
                ),
            );
        }
        if let (Some(title), Some(date)) = (title, date) {
            exams.push(Exam::new(title, date));
        }
    }

    errors.into_result(|| ScheduleRequest { exams })
}

fn required<'a>(
    fields: &'a FormFields,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    let value = fields.get(name);
    if value.is_none() {
        errors.push(name, Violation::new(Constraint::Required, REQUIRED_MESSAGE));
    }
    value
}

fn min_length(value: &str, name: &str, min: usize, message: &str, errors: &mut ValidationErrors) {
    if value.chars().count() < min {
        errors.push(name, Violation::new(Constraint::MinLength(min), message));
    }
}

fn text_member<'a>(
    object: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<&'a str> {
    object
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn study_fields(course: &str, style: &str, goals: &str) -> FormFields {
        FormFields::new()
            .with(COURSE, course)
            .with(LEARNING_STYLE, style)
            .with(STUDY_GOALS, goals)
    }

    #[test]
    fn test_valid_study_input() {
        let request =
            validate_study_recommendations(&study_fields("Biology", "Visual", "Pass the final exam"))
                .unwrap();

        assert_eq!(request.course, "Biology");
        assert_eq!(request.learning_style, "Visual");
        assert_eq!(request.study_goals, "Pass the final exam");
    }

    #[test]
    fn test_short_course_and_goals() {
        let errors = validate_study_recommendations(&study_fields("B", "Visual", "pass"))
            .unwrap_err();

        assert_eq!(errors.field_names(), vec![COURSE, STUDY_GOALS]);
        assert_eq!(
            errors.to_field_messages()[COURSE],
            vec![COURSE_TOO_SHORT.to_string()]
        );
        assert_eq!(
            errors.get(STUDY_GOALS).unwrap()[0].constraint,
            Constraint::MinLength(10)
        );
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = validate_study_recommendations(&FormFields::new()).unwrap_err();

        assert_eq!(errors.field_names(), vec![COURSE, LEARNING_STYLE, STUDY_GOALS]);
        assert!(errors.only(Constraint::Required));
    }

    #[test]
    fn test_learning_style_only_needs_to_be_present() {
        assert!(
            validate_study_recommendations(&study_fields("Biology", "", "Pass the final exam"))
                .is_ok()
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 15 characters, more than 15 bytes
        let situation = "ééééééééééééééé";
        assert_eq!(situation.chars().count(), 15);
        let fields = FormFields::new().with(SITUATION, situation);
        assert!(validate_stress_feedback(&fields).is_ok());

        let fields = FormFields::new().with(SITUATION, "éééééééééééééé");
        let errors = validate_stress_feedback(&fields).unwrap_err();
        assert_eq!(
            errors.to_field_messages()[SITUATION],
            vec![SITUATION_TOO_SHORT.to_string()]
        );
    }

    #[test]
    fn test_exams_parsed_in_order() {
        let fields = FormFields::new().with(
            EXAMS,
            r#"[{"title":"Biology","date":"2024-06-01"},{"title":"Algebra","date":"2024-05-01"}]"#,
        );
        let request = validate_study_schedule(&fields).unwrap();

        assert_eq!(
            request.exams,
            vec![
                Exam::new("Biology", "2024-06-01"),
                Exam::new("Algebra", "2024-05-01")
            ]
        );
    }

    #[test]
    fn test_empty_exam_list() {
        let fields = FormFields::new().with(EXAMS, "[]");
        let errors = validate_study_schedule(&fields).unwrap_err();

        assert!(errors.only(Constraint::NonEmpty));
        assert_eq!(
            errors.to_field_messages()[EXAMS],
            vec![NO_EXAMS_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_malformed_exams() {
        let fields = FormFields::new().with(EXAMS, "not json");
        let errors = validate_study_schedule(&fields).unwrap_err();
        assert_eq!(errors.get(EXAMS).unwrap()[0].constraint, Constraint::Malformed);

        let fields = FormFields::new().with(EXAMS, r#"{"title":"Biology"}"#);
        assert!(validate_study_schedule(&fields).is_err());
    }

    #[test]
    fn test_exam_elements_checked_individually() {
        let fields = FormFields::new().with(
            EXAMS,
            r#"[{"title":"Biology","date":"2024-06-01"},{"date":"2024-05-01"},{"title":"Art","date":""}]"#,
        );
        let errors = validate_study_schedule(&fields).unwrap_err();

        assert_eq!(
            errors.to_field_messages()[EXAMS],
            vec![
                "Exam 2 is missing a title.".to_string(),
                "Exam 3 is missing a date.".to_string()
            ]
        );
        assert!(!errors.only(Constraint::NonEmpty));
    }

    #[test]
    fn test_validate_dispatches_by_capability() {
        let fields = FormFields::new().with(SITUATION, "I have three exams next week");
        let request = validate(Capability::StressFeedback, &fields).unwrap();

        assert_eq!(request.capability(), Capability::StressFeedback);
        assert!(validate(Capability::StudySchedule, &fields).is_err());
    }

    #[test]
    fn test_form_fields_deserialize_from_map() {
        let fields: FormFields =
            serde_json::from_str(r#"{"course":"Biology","learningStyle":"Visual"}"#).unwrap();

        assert_eq!(fields.get(COURSE), Some("Biology"));
        assert_eq!(fields.get(STUDY_GOALS), None);
    }
}
