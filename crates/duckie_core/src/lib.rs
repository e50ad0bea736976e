//! DuckieMind Core - prompt pipeline for the student wellness assistant
//!
//! Raw form input is validated into a typed capability request, rendered
//! into a fixed prompt, and sent to a hosted language model that answers
//! with a structured record. The flows in [`flow`] tie these steps together.

pub mod capability;
pub mod config;
pub mod error;
pub mod flow;
pub mod model;
pub mod prompt_template;
pub mod schema;
pub mod utils;
pub mod wellness;

pub use capability::{
    Capability, CapabilityRequest, CapabilityResponse, Exam, ScheduleRequest,
    StressFeedbackRequest, StudyRecommendationRequest,
};
pub use config::ModelConfig;
pub use error::{CoreError, ModelError, Result};
pub use flow::{FlowDefinition, Flows};
pub use model::{GeminiClient, MockModelProvider, ModelProvider, OutputShape};
pub use prompt_template::{PromptTemplate, RenderedPrompt};
pub use schema::{FormFields, ValidationErrors};
