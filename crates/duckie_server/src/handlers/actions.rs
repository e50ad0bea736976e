//! Capability action endpoints
//!
//! Bodies are read as raw fields so validation, not extraction, reports
//! missing inputs. Every outcome is a 200 with an action state.

use axum::{Form, Json, extract::State};
use duckie_api::{ActionResult, FormFields};

use crate::{actions, state::AppState};

pub async fn study_recommendations(
    State(state): State<AppState>,
    Form(fields): Form<FormFields>,
) -> Json<ActionResult> {
    Json(actions::generate_study_recommendations(&state.flows, &fields).await)
}

pub async fn stress_feedback(
    State(state): State<AppState>,
    Form(fields): Form<FormFields>,
) -> Json<ActionResult> {
    Json(actions::generate_stress_feedback(&state.flows, &fields).await)
}

pub async fn study_schedule(
    State(state): State<AppState>,
    Form(fields): Form<FormFields>,
) -> Json<ActionResult> {
    Json(actions::generate_study_schedule(&state.flows, &fields).await)
}
