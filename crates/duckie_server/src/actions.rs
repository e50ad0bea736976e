//! Action entry points: raw form fields in, an [`ActionResult`] out.
//!
//! Nothing here ever fails. Validation problems, empty model answers and
//! faults all become a message for the caller; fault details stay in the logs.

use duckie_api::ActionResult;
use duckie_core::schema::{self, Constraint, FormFields, ValidationErrors};
use duckie_core::{Capability, Flows, log_error};

pub const SUCCESS_MESSAGE: &str = "Success!";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred on the server.";

pub async fn generate_study_recommendations(flows: &Flows, fields: &FormFields) -> ActionResult {
    perform(flows, Capability::StudyRecommendations, fields).await
}

pub async fn generate_stress_feedback(flows: &Flows, fields: &FormFields) -> ActionResult {
    perform(flows, Capability::StressFeedback, fields).await
}

pub async fn generate_study_schedule(flows: &Flows, fields: &FormFields) -> ActionResult {
    perform(flows, Capability::StudySchedule, fields).await
}

/// Run one capability end to end.
pub async fn perform(flows: &Flows, capability: Capability, fields: &FormFields) -> ActionResult {
    let request = match schema::validate(capability, fields) {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(%capability, fields = ?errors.field_names(), "Rejected invalid input");
            return rejected(capability, &errors);
        }
    };

    match flows.dispatch(&request).await {
        Ok(Some(response)) => {
            tracing::info!(%capability, "Generated response");
            ActionResult::success(SUCCESS_MESSAGE, response)
        }
        Ok(None) => {
            tracing::warn!(%capability, "Model returned no usable text");
            ActionResult::message(empty_result_message(capability))
        }
        Err(err) => {
            log_error!(format!("{capability} flow failed"), err);
            ActionResult::message(UNEXPECTED_ERROR_MESSAGE)
        }
    }
}

fn rejected(capability: Capability, errors: &ValidationErrors) -> ActionResult {
    let message = match capability {
        Capability::StudySchedule if errors.only(Constraint::NonEmpty) => schema::NO_EXAMS_MESSAGE,
        _ => validation_message(capability),
    };
    ActionResult::invalid(message, errors)
}

pub fn validation_message(capability: Capability) -> &'static str {
    match capability {
        Capability::StudyRecommendations => "Validation failed. Please check your inputs.",
        Capability::StressFeedback => "Validation failed. Please describe your situation.",
        Capability::StudySchedule => "Validation failed. No exams found.",
    }
}

pub fn empty_result_message(capability: Capability) -> &'static str {
    match capability {
        Capability::StudyRecommendations => "Could not generate recommendations. Please try again.",
        Capability::StressFeedback => "Could not generate feedback. Please try again.",
        Capability::StudySchedule => "Could not generate a schedule. Please try again.",
    }
}
