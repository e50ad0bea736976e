//! Capability flows: render a validated request, call the model, decode the reply.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::Instrument;

use crate::capability::{
    Capability, CapabilityRequest, CapabilityResponse, ScheduleRequest, StressFeedbackRequest,
    StudyRecommendationRequest,
};
use crate::error::{CoreError, Result};
use crate::model::{GenerationRequest, ModelProvider, OutputShape};
use crate::prompt_template::{PromptTemplate, RenderedPrompt};

pub mod definitions;

/// Static description of one capability flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowDefinition {
    pub name: &'static str,
    pub prompt_name: &'static str,
    pub capability: Capability,
    pub template: &'static str,
    pub output: OutputShape,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecommendationsOutput {
    #[serde(default)]
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressFeedbackOutput {
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyScheduleOutput {
    #[serde(default)]
    pub schedule: Option<String>,
}

/// A stateless pipeline from a typed request `I` to a typed output `O`.
pub struct Flow<I, O> {
    definition: FlowDefinition,
    template: PromptTemplate,
    provider: Arc<dyn ModelProvider>,
    _types: PhantomData<fn(&I) -> O>,
}

pub type StudyRecommendationsFlow = Flow<StudyRecommendationRequest, StudyRecommendationsOutput>;
pub type StressFeedbackFlow = Flow<StressFeedbackRequest, StressFeedbackOutput>;
pub type StudyScheduleFlow = Flow<ScheduleRequest, StudyScheduleOutput>;

impl<I, O> Flow<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    pub fn new(definition: FlowDefinition, provider: Arc<dyn ModelProvider>) -> Result<Self> {
        let template = PromptTemplate::new(definition.prompt_name, definition.template)?;
        Ok(Self {
            definition,
            template,
            provider,
            _types: PhantomData,
        })
    }

    pub fn render(&self, input: &I) -> Result<RenderedPrompt> {
        self.template.render(input)
    }

    /// One render and exactly one model call. Errors propagate unchanged.
    pub async fn run(&self, input: &I) -> Result<O> {
        let span = tracing::info_span!("flow", name = self.definition.name);
        async move {
            let prompt = self.render(input)?;
            tracing::debug!(prompt = %prompt, "Rendered prompt");

            let request = GenerationRequest {
                name: self.definition.prompt_name,
                prompt,
                output: self.definition.output,
            };
            let record = self.provider.generate(&request).await?;

            serde_json::from_value(Value::Object(record)).map_err(|e| {
                CoreError::SerializationError {
                    data_type: self.definition.name.to_string(),
                    cause: e,
                }
            })
        }
        .instrument(span)
        .await
    }
}

impl<I, O> fmt::Debug for Flow<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.definition.name)
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .finish()
    }
}

/// The three capability flows sharing one model provider
#[derive(Debug)]
pub struct Flows {
    pub study_recommendations: StudyRecommendationsFlow,
    pub stress_feedback: StressFeedbackFlow,
    pub study_schedule: StudyScheduleFlow,
    provider: Arc<dyn ModelProvider>,
}

impl Flows {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Result<Self> {
        Ok(Self {
            study_recommendations: Flow::new(
                definitions::STUDY_RECOMMENDATIONS,
                Arc::clone(&provider),
            )?,
            stress_feedback: Flow::new(definitions::STRESS_FEEDBACK, Arc::clone(&provider))?,
            study_schedule: Flow::new(definitions::STUDY_SCHEDULE, Arc::clone(&provider))?,
            provider,
        })
    }

    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    /// Render the prompt a request would send, without calling the model.
    pub fn render(&self, request: &CapabilityRequest) -> Result<RenderedPrompt> {
        match request {
            CapabilityRequest::StudyRecommendations(input) => {
                self.study_recommendations.render(input)
            }
            CapabilityRequest::StressFeedback(input) => self.stress_feedback.render(input),
            CapabilityRequest::StudySchedule(input) => self.study_schedule.render(input),
        }
    }

    /// Run the flow matching the request.
    ///
    /// `Ok(None)` means the model answered but produced no usable text.
    pub async fn dispatch(&self, request: &CapabilityRequest) -> Result<Option<CapabilityResponse>> {
        let capability = request.capability();
        let text = match request {
            CapabilityRequest::StudyRecommendations(input) => {
                self.study_recommendations.run(input).await?.recommendations
            }
            CapabilityRequest::StressFeedback(input) => {
                self.stress_feedback.run(input).await?.feedback
            }
            CapabilityRequest::StudySchedule(input) => self.study_schedule.run(input).await?.schedule,
        };
        Ok(CapabilityResponse::non_blank(capability, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Exam;
    use crate::error::ModelError;
    use crate::model::MockModelProvider;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn flows_with(provider: &Arc<MockModelProvider>) -> Flows {
        let provider: Arc<dyn ModelProvider> = provider.clone();
        Flows::new(provider).unwrap()
    }

    #[test]
    fn test_study_prompt_text() {
        let flows = flows_with(&Arc::new(MockModelProvider::replying(json!({}))));
        let request = CapabilityRequest::StudyRecommendations(StudyRecommendationRequest {
            course: "Organic Chemistry".into(),
            learning_style: "Visual".into(),
            study_goals: "Master reaction mechanisms".into(),
        });

        let prompt = flows.render(&request).unwrap();
        assert_eq!(prompt.template(), "personalized_study_recommendations_prompt");
        assert!(prompt.as_str().contains(
            "Course: Organic Chemistry\nLearning Style: Visual\nStudy Goals: Master reaction mechanisms\n\nRecommendations:"
        ));
    }

    #[test]
    fn test_situation_inserted_verbatim() {
        let flows = flows_with(&Arc::new(MockModelProvider::replying(json!({}))));
        let situation = "I wrote <script> and {{ oops }} & \"panicked\"";
        let request = CapabilityRequest::StressFeedback(StressFeedbackRequest {
            situation: situation.into(),
        });

        let prompt = flows.render(&request).unwrap();
        assert!(prompt.as_str().contains(&format!("Situation:\n\"{situation}\"")));
        assert!(prompt.as_str().contains("You are NOT a medical professional."));
    }

    #[test]
    fn test_exam_lines_keep_input_order() {
        let flows = flows_with(&Arc::new(MockModelProvider::replying(json!({}))));
        let request = CapabilityRequest::StudySchedule(ScheduleRequest {
            exams: vec![
                Exam::new("Biology", "2024-06-10"),
                Exam::new("Algebra", "2024-06-01"),
            ],
        });

        let prompt = flows.render(&request).unwrap();
        assert!(prompt.as_str().contains(
            "Here are the user's exams:\n- Biology on 2024-06-10\n- Algebra on 2024-06-01\n\nGenerate the study schedule now."
        ));
    }

    #[test]
    fn test_earlier_listed_exam_renders_first() {
        let flows = flows_with(&Arc::new(MockModelProvider::replying(json!({}))));
        let request = CapabilityRequest::StudySchedule(ScheduleRequest {
            exams: vec![Exam::new("Midterm", "May 1"), Exam::new("Final", "May 20")],
        });

        let prompt = flows.render(&request).unwrap().into_text();
        let midterm = prompt.find("- Midterm on May 1").unwrap();
        let final_exam = prompt.find("- Final on May 20").unwrap();
        assert!(midterm < final_exam);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let flows = flows_with(&Arc::new(MockModelProvider::replying(json!({}))));
        let request = CapabilityRequest::StressFeedback(StressFeedbackRequest {
            situation: "Three deadlines on the same day".into(),
        });

        assert_eq!(
            flows.render(&request).unwrap(),
            flows.render(&request).unwrap()
        );
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let provider = Arc::new(MockModelProvider::replying(
            json!({ "feedback": "It's okay to feel this way." }),
        ));
        let flows = flows_with(&provider);
        let request = CapabilityRequest::StressFeedback(StressFeedbackRequest {
            situation: "Three deadlines on the same day".into(),
        });

        let response = flows.dispatch(&request).await.unwrap();
        assert_eq!(
            response,
            Some(CapabilityResponse::Feedback(
                "It's okay to feel this way.".into()
            ))
        );
        assert_eq!(provider.calls(), 1);

        let sent = provider.last_request().unwrap();
        assert_eq!(sent.name, "stress_coping_feedback_prompt");
        assert_eq!(sent.output, definitions::STRESS_FEEDBACK.output);
    }

    #[tokio::test]
    async fn test_dispatch_empty_reply() {
        let provider = Arc::new(MockModelProvider::replying(json!({ "schedule": "   " })));
        let flows = flows_with(&provider);
        let request = CapabilityRequest::StudySchedule(ScheduleRequest {
            exams: vec![Exam::new("Biology", "2024-06-10")],
        });

        assert_eq!(flows.dispatch(&request).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_run_propagates_provider_error() {
        let provider = Arc::new(MockModelProvider::failing("quota exhausted"));
        let flows = flows_with(&provider);
        let input = StudyRecommendationRequest {
            course: "History".into(),
            learning_style: "Auditory".into(),
            study_goals: "Remember key dates".into(),
        };

        let err = flows.study_recommendations.run(&input).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::Unavailable { .. },
                ..
            }
        ));
        assert_eq!(provider.calls(), 1);
    }
}
